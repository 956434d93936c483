//! Outbound notifications.
//!
//! Messages are composed from a cycle's outcome by pure functions and handed
//! to a [`Notifier`]. [`SmtpNotifier`] delivers them over SMTP with STARTTLS;
//! [`LogNotifier`] only logs them and is used when `[notify]` is not
//! configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::NotifyConfig;
use crate::models::JobRecord;
use crate::reconcile::Diff;

/// A composed plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Reject a recipient this notifier could never deliver to. Called
    /// before a cycle touches the store.
    fn check_recipient(&self, _to: &str) -> Result<()> {
        Ok(())
    }

    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Parse an email address the way the SMTP notifier will send to it.
pub fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .with_context(|| format!("invalid recipient address: {}", address))
}

/// Greeting sent once, when a search's baseline is recorded.
pub fn compose_welcome(to: &str, search_url: &str, baseline: usize) -> Notification {
    let body = format!(
        "The itsy bitsy spider climbed up the waterspout.\n\
         \n\
         Now watching {search_url}\n\
         {baseline} postings recorded as the baseline.\n\
         You will get an email when new postings appear or listed ones disappear.\n"
    );
    Notification {
        to: to.to_string(),
        subject: "Greetings, it's your itsy bitsy spider /\\(00)/\\".to_string(),
        body,
    }
}

fn push_job(body: &mut String, job: &JobRecord) {
    body.push_str(&format!("  * {} at {}\n", job.job_title, job.company_title));
    body.push_str(&format!("    {}\n", job.url));
    if !job.tags.is_empty() {
        body.push_str(&format!("    tags: {}\n", job.tags.join(", ")));
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

/// One digest for a whole cycle: new postings first, then the ones that are
/// no longer listed.
pub fn compose_digest(to: &str, search_url: &str, diff: &Diff) -> Notification {
    let subject = match (diff.new_records.len(), diff.expired.len()) {
        (0, expired) => format!("startit: {} no longer listed", plural(expired, "job", "jobs")),
        (new, 0) => format!("startit: {}", plural(new, "new job", "new jobs")),
        (new, expired) => format!(
            "startit: {}, {} gone",
            plural(new, "new job", "new jobs"),
            expired
        ),
    };

    let mut body = format!("Search: {}\n", search_url);
    if !diff.new_records.is_empty() {
        body.push_str(&format!("\nNew postings ({}):\n\n", diff.new_records.len()));
        for job in &diff.new_records {
            push_job(&mut body, job);
        }
    }
    if !diff.expired.is_empty() {
        body.push_str(&format!("\nNo longer listed ({}):\n\n", diff.expired.len()));
        for job in &diff.expired {
            push_job(&mut body, job);
        }
    }

    Notification {
        to: to.to_string(),
        subject,
        body,
    }
}

/// Whether a cycle's changes warrant a digest.
pub fn should_notify(diff: &Diff, include_expired: bool) -> bool {
    !diff.new_records.is_empty() || (include_expired && !diff.expired.is_empty())
}

/// Delivers notifications through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid notify.from address: {}", config.from))?;
        let credentials = Credentials::new(config.username().to_string(), config.password()?);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .with_context(|| format!("invalid SMTP relay: {}", config.smtp_host))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn check_recipient(&self, to: &str) -> Result<()> {
        parse_mailbox(to).map(|_| ())
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let to = parse_mailbox(&notification.to)?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .with_context(|| format!("Failed to send email to {}", notification.to))?;
        tracing::info!(to = %notification.to, subject = %notification.subject, "email sent");
        Ok(())
    }
}

/// Logs notifications instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "notification not delivered (no [notify] config)\n{}",
            notification.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = "https://startit.rs/poslovi/pretraga/python/";

    fn job(title: &str, tags: &[&str]) -> JobRecord {
        JobRecord {
            company_title: "Acme".to_string(),
            job_title: title.to_string(),
            url: format!("https://startit.rs/poslovi/{}/", title.to_lowercase()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_digest_lists_new_jobs() {
        let diff = Diff {
            new_records: vec![job("Python", &["python", "django"]), job("Go", &[])],
            expired: vec![],
        };
        let n = compose_digest("me@example.com", SEARCH, &diff);
        assert_eq!(n.to, "me@example.com");
        assert_eq!(n.subject, "startit: 2 new jobs");
        assert!(n.body.contains("New postings (2):"));
        assert!(n.body.contains("  * Python at Acme"));
        assert!(n.body.contains("    tags: python, django"));
        assert!(n.body.contains("https://startit.rs/poslovi/go/"));
        assert!(!n.body.contains("No longer listed"));
    }

    #[test]
    fn test_digest_mixed_subject() {
        let diff = Diff {
            new_records: vec![job("A", &[])],
            expired: vec![job("B", &[]), job("C", &[])],
        };
        let n = compose_digest("me@example.com", SEARCH, &diff);
        assert_eq!(n.subject, "startit: 1 new job, 2 gone");
        assert!(n.body.contains("No longer listed (2):"));
    }

    #[test]
    fn test_digest_expired_only_subject() {
        let diff = Diff {
            new_records: vec![],
            expired: vec![job("B", &[])],
        };
        let n = compose_digest("me@example.com", SEARCH, &diff);
        assert_eq!(n.subject, "startit: 1 job no longer listed");
    }

    #[test]
    fn test_digest_body_layout() {
        let diff = Diff {
            new_records: vec![job("Rust", &["rust", "tokio"])],
            expired: vec![job("Go", &[])],
        };
        let n = compose_digest("me@example.com", SEARCH, &diff);
        assert_eq!(
            n.body,
            concat!(
                "Search: https://startit.rs/poslovi/pretraga/python/\n",
                "\n",
                "New postings (1):\n",
                "\n",
                "  * Rust at Acme\n",
                "    https://startit.rs/poslovi/rust/\n",
                "    tags: rust, tokio\n",
                "\n",
                "No longer listed (1):\n",
                "\n",
                "  * Go at Acme\n",
                "    https://startit.rs/poslovi/go/\n",
            )
        );
    }

    #[test]
    fn test_parse_mailbox() {
        assert!(parse_mailbox("me@example.com").is_ok());
        assert!(parse_mailbox("Spider <spider@example.com>").is_ok());
        let err = parse_mailbox("not-an-address").unwrap_err();
        assert_eq!(err.to_string(), "invalid recipient address: not-an-address");
    }

    #[test]
    fn test_should_notify() {
        let expired_only = Diff {
            new_records: vec![],
            expired: vec![job("B", &[])],
        };
        assert!(should_notify(&expired_only, true));
        assert!(!should_notify(&expired_only, false));
        assert!(!should_notify(&Diff::default(), true));
    }

    #[test]
    fn test_welcome_mentions_baseline() {
        let n = compose_welcome("me@example.com", SEARCH, 7);
        assert!(n.subject.contains("itsy bitsy spider"));
        assert!(n.body.contains("7 postings recorded"));
        assert!(n.body.contains(SEARCH));
    }
}
