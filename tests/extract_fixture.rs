//! Extraction against a saved listing page with every posting tier.

use startit_watch::error::ScrapeError;
use startit_watch::extract::MarkupExtractor;
use startit_watch::models::{JobRecord, Tier};

const LISTING: &str = include_str!("fixtures/listing_python.html");

fn job(company: &str, title: &str, url: &str, tags: &[&str]) -> JobRecord {
    JobRecord {
        company_title: company.to_string(),
        job_title: title.to_string(),
        url: url.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn test_fixture_tiers_in_order() {
    let jobs = MarkupExtractor::new().unwrap().extract(LISTING).unwrap();

    assert_eq!(
        jobs,
        vec![
            job(
                "Acme Software",
                "Senior Python Developer",
                "https://startit.rs/poslovi/senior-python-developer-acme/",
                &[".net", "chrarp", "node.js", "python"],
            ),
            job(
                "Beta Labs",
                "Backend Engineer",
                "https://startit.rs/poslovi/backend-engineer-beta/",
                &["django"],
            ),
            job(
                "Gamma & Co",
                "QA Automation Engineer",
                "https://startit.rs/poslovi/qa-automation-gamma/",
                &["python", "selenium"],
            ),
            job(
                "Delta Analytics",
                "Junior Data Engineer",
                "https://startit.rs/poslovi/junior-data-engineer-delta/",
                &["python", "sql"],
            ),
        ]
    );
}

#[test]
fn test_fixture_extraction_idempotent() {
    let extractor = MarkupExtractor::new().unwrap();
    let first = extractor.extract(LISTING).unwrap();
    let second = extractor.extract(LISTING).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fixture_partition_counts() {
    let document = scraper::Html::parse_document(LISTING);
    let extractor = MarkupExtractor::new().unwrap();
    let tiers: Vec<Tier> = extractor
        .partition(&document)
        .iter()
        .map(|p| p.tier)
        .collect();
    assert_eq!(
        tiers,
        vec![Tier::Premium, Tier::Premium, Tier::Standard, Tier::Mini]
    );
}

#[test]
fn test_broken_tag_discards_every_record() {
    // The first premium posting loses the link inside its last tag.
    let broken = LISTING.replacen(
        r#"<small><a href="https://startit.rs/poslovi/pretraga/python/">python</a></small>
    </div>
  </div>"#,
        "<small>python</small>\n    </div>\n  </div>",
        1,
    );
    assert_ne!(broken, LISTING, "fixture edit did not apply");

    let err = MarkupExtractor::new().unwrap().extract(&broken).unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Extraction {
            tier: Tier::Premium,
            index: 0,
            missing: "tag link",
        }
    ));
}
