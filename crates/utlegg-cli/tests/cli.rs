//! End-to-end tests of the `utlegg` binary.

use std::io::Cursor;
use std::path::Path;

use assert_cmd::Command;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with configuration isolated to `config_home`.
fn utlegg(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("utlegg").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env("NO_COLOR", "1");
    cmd
}

fn write_png(path: &Path, width: u32, height: u32) {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([240, 240, 240])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn write_pdf(path: &Path, pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 14.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Invoice page {}", i + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn write_report(dir: &Path, bank_account: &str, attachments: &[&str]) -> std::path::PathBuf {
    let expenses: Vec<serde_json::Value> = attachments
        .iter()
        .enumerate()
        .map(|(i, file)| {
            serde_json::json!({
                "description": format!("Utlegg {}", i + 1),
                "category": "7350 Bevertning",
                "amount": "10.25",
                "attachment": file,
            })
        })
        .collect();

    let report = serde_json::json!({
        "payer": {
            "name": "Kari Nordmann",
            "streetAddress": "Storgata 1",
            "postalCode": "0155",
            "city": "Oslo",
            "country": "Norway"
        },
        "bankAccount": bank_account,
        "email": "kari@example.no",
        "date": "2026-10-16",
        "expenses": expenses,
    });

    let path = dir.join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(&report).unwrap()).unwrap();
    path
}

#[test]
fn validate_accepts_valid_accounts() {
    let home = TempDir::new().unwrap();
    utlegg(home.path())
        .args(["validate", "8601 11 17947", "GB82 WEST 1234 5698 7654 32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8601 11 17947"))
        .stdout(predicate::str::contains("GB82 WEST 1234 5698 7654 32"));
}

#[test]
fn validate_fails_on_invalid_account() {
    let home = TempDir::new().unwrap();
    utlegg(home.path())
        .args(["validate", "NO9386011117947", "NO9386011117948"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid"))
        .stderr(predicate::str::contains("1 of 2"));
}

#[test]
fn validate_json_output() {
    let home = TempDir::new().unwrap();
    utlegg(home.path())
        .args(["validate", "--json", "86011117947"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"bban\""))
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn categories_lists_taxonomy() {
    let home = TempDir::new().unwrap();
    utlegg(home.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Arrangement"))
        .stdout(predicate::str::contains("7350 Bevertning"));
}

#[test]
fn categories_filters_by_group() {
    let home = TempDir::new().unwrap();
    utlegg(home.path())
        .args(["categories", "--group", "reise"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7140 Reise og transport"))
        .stdout(predicate::str::contains("Bevertning").not());

    utlegg(home.path())
        .args(["categories", "--group", "Ferie"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category group"));
}

#[test]
fn generate_writes_pdf_with_all_pages() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("pizza.png"), 60, 40);
    write_pdf(&dir.path().join("invoice.pdf"), 2);
    let report = write_report(dir.path(), "NO93 8601 1117 947", &["pizza.png", "invoice.pdf"]);
    let output = dir.path().join("out.pdf");

    utlegg(home.path())
        .arg("generate")
        .arg(&report)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 pages"))
        .stdout(predicate::str::contains("20,50"));

    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 1 + 1 + 2);
}

#[test]
fn generate_uses_date_file_name() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("receipt.png"), 10, 10);
    let report = write_report(dir.path(), "86011117947", &["receipt.png"]);

    utlegg(home.path())
        .current_dir(dir.path())
        .arg("generate")
        .arg(&report)
        .args(["--locale", "en-GB", "--resize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20.50").not())
        .stdout(predicate::str::contains("10.25"));

    assert!(dir.path().join("2026-10-16-expense-report.pdf").exists());
}

fn cover_text(path: &Path) -> Vec<u8> {
    let doc = Document::load(path).unwrap();
    let cover = doc.get_pages()[&1];
    doc.get_page_content(cover).unwrap()
}

#[test]
fn generate_fills_country_from_locale() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("receipt.png"), 10, 10);
    let report = write_report(dir.path(), "86011117947", &["receipt.png"]);

    let mut json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    json["payer"].as_object_mut().unwrap().remove("country");
    std::fs::write(&report, json.to_string()).unwrap();

    for (locale, address) in [
        ("nb-NO", &b"(Storgata 1, 0155 Oslo, Norway)"[..]),
        ("en-GB", &b"(Storgata 1, 0155 Oslo, United Kingdom)"[..]),
    ] {
        let output = dir.path().join(format!("{}.pdf", locale));
        utlegg(home.path())
            .arg("generate")
            .arg(&report)
            .args(["--locale", locale, "-o"])
            .arg(&output)
            .assert()
            .success();

        let content = cover_text(&output);
        assert!(content.windows(address.len()).any(|w| w == address), "{}", locale);
    }
}

#[test]
fn generate_rejects_invalid_report() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("receipt.png"), 10, 10);
    let report = write_report(dir.path(), "8601 11 17948", &["receipt.png"]);

    utlegg(home.path())
        .arg("generate")
        .arg(&report)
        .arg("-o")
        .arg(dir.path().join("out.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("bankAccount"));

    assert!(!dir.path().join("out.pdf").exists());
}

#[test]
fn generate_rejects_unsupported_attachment() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.jpg"), "not really a photo").unwrap();
    let report = write_report(dir.path(), "86011117947", &["notes.jpg"]);

    utlegg(home.path())
        .arg("generate")
        .arg(&report)
        .arg("-o")
        .arg(dir.path().join("out.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported attachment format for notes.jpg"));

    assert!(!dir.path().join("out.pdf").exists());
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();

    utlegg(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(home.path().join("utlegg").join("config.json").exists());

    utlegg(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    utlegg(home.path())
        .args(["config", "get", "layout.row_height"])
        .assert()
        .success()
        .stdout(predicate::str::contains("22"));

    utlegg(home.path())
        .args(["config", "set", "report.locale", "en-GB"])
        .assert()
        .success();

    utlegg(home.path())
        .args(["config", "get", "report.locale"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"en-GB\""));

    utlegg(home.path())
        .args(["config", "set", "report.locale", "fr-FR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}
