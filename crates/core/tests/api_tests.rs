//! Library API integration tests
use lektion_core::*;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

#[test]
fn test_parse_news_article() {
    let html = read_fixture("news_article.html");
    let result = Extractor::new().parse(&html).expect("should extract");

    assert_eq!(result.title, "Neue Brücke für Köln");
    assert!(result.content.starts_with("Die Stadt Köln baut eine neue Brücke"));
    assert!(result.content.contains("Baubeginn: im Frühjahr nächsten Jahres"));
    assert!(result.is_usable(150));
}

#[test]
fn test_noise_does_not_reach_content() {
    let html = read_fixture("news_article.html");
    let result = Extractor::new().parse(&html).unwrap();

    for noise in ["Cookies", "Teilen auf", "Impressum", "Politik", "Radwege", "dataLayer"] {
        assert!(!result.content.contains(noise), "{} leaked into content", noise);
    }
}

#[test]
fn test_glossary_block_survives() {
    let html = read_fixture("news_article.html");
    let result = Extractor::new().parse(&html).unwrap();
    assert!(result.content.contains("Eine Brücke führt über einen Fluss"));
}

#[test]
fn test_parse_jsonld_article() {
    let html = read_fixture("jsonld_article.html");
    let result = Extractor::new().parse(&html).unwrap();

    assert_eq!(result.title, "Berlin hat gewählt");
    assert!(result.content.starts_with("Am Sonntag haben die Menschen in Berlin"));
}

#[test]
fn test_parse_largest_block() {
    let html = read_fixture("largest_block.html");
    let result = Extractor::new().parse(&html).unwrap();

    assert_eq!(result.title, "Wetter im Herbst");
    assert!(result.content.contains("Im Herbst wird es in Deutschland langsam kälter."));
    assert!(result.content.contains("Am Morgen ist es häufig neblig."));
    assert!(!result.content.contains("Startseite"));
}

#[test]
fn test_parse_empty_content_misses() {
    let html = read_fixture("empty_content.html");
    let miss = Extractor::new().parse(&html).unwrap_err();
    assert!(miss.reason().contains("largest block"));
}

#[test]
fn test_fifth_selector_beats_largest_block() {
    let own: String = (0..4)
        .map(|i| format!("<p>Absatz {} im eigentlichen Artikel mit genügend Text darin.</p>", i))
        .collect();
    let other: String = (0..20)
        .map(|i| format!("<p>Ein viel längerer Archivtext Nummer {} mit sehr viel mehr Inhalt.</p>", i))
        .collect();
    let html = format!(
        r#"<html><body>
            <article><p>Kurzer Vorspann.</p></article>
            <div class="article-content">{}</div>
            <div class="archiv">{}</div>
        </body></html>"#,
        own, other
    );

    let fifth = SelectorList::default().iter().nth(4).unwrap().as_str().to_string();
    assert_eq!(fifth, ".article-content");

    let result = Extractor::new().parse(&html).unwrap();
    assert!(result.content.starts_with("Absatz 0 im eigentlichen Artikel"));
    assert!(!result.content.contains("Archivtext"));
}

#[test]
fn test_dedup_keeps_first_seen() {
    let prefix = "Dieser Satz beginnt in beiden Absätzen ganz genau gleich und ";
    let html = format!(
        r#"<html><body><div class="article-body"><p>{0}endet hier zuerst.</p><p>{0}endet dann anders.</p><p>{1}</p></div></body></html>"#,
        prefix,
        "Ein dritter Absatz sorgt dafür, dass der Container genug Text für die Auswahl hat.".repeat(2)
    );

    let result = Extractor::new().parse(&html).unwrap();
    assert_eq!(result.content.matches(prefix).count(), 1);
    assert!(result.content.contains("endet hier zuerst."));
    assert!(!result.content.contains("endet dann anders."));
}

#[test]
fn test_custom_selector_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selectors.txt");
    std::fs::write(&path, "# only the center column\n.col-center\n").unwrap();

    let config = ExtractorConfig::builder()
        .selectors(SelectorList::parse_file(&path).unwrap())
        .build();
    let result = Extractor::with_config(config)
        .parse(&read_fixture("largest_block.html"))
        .unwrap();

    assert!(!result.content.contains("Heute: 12 Grad"));
    assert!(result.content.contains("Die Blätter werden vorher gelb"));
}

#[test]
fn test_strip_noise_api() {
    let html = read_fixture("news_article.html");
    let stripped = strip_noise(&html, &NoiseConfig::default());

    assert!(!stripped.contains("cookie-banner"));
    assert!(!stripped.contains("<script"));
    assert!(stripped.contains("article-content"));
}

#[test]
fn test_extraction_result_serializes() {
    let result = ExtractionResult::new("Titel", "Inhalt");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["title"], "Titel");
    assert_eq!(json["content"], "Inhalt");
}
