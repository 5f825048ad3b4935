use perceiver_extract::{extract, DomNode, ExtractOptions};
use tabpilot_core_types::SelectorHint;

const RESULTS_URL: &str = "https://www.google.com/search?q=budget+laptops";

fn result_block(title: &str, href: &str, snippet: &str) -> DomNode {
    DomNode::element("div").with_class("MjjYud").with_child(
        DomNode::element("div")
            .with_attr("data-hveid", "CA")
            .with_children([
                DomNode::element("a")
                    .with_attr("href", href)
                    .with_child(DomNode::element("h3").with_text(title)),
                DomNode::element("div").with_class("VwiC3b").with_text(snippet),
            ]),
    )
}

fn results_page(count: usize) -> DomNode {
    let chrome = DomNode::element("div").with_attr("role", "navigation").with_children([
        DomNode::element("a")
            .with_attr("href", "/search?q=budget+laptops&tbm=isch")
            .with_text("Images"),
        DomNode::element("a").with_attr("href", "/maps").with_text("Maps"),
    ]);
    let junk = DomNode::element("div")
        .with_attr("data-hveid", "CB")
        .with_children([
            DomNode::element("a")
                .with_attr("href", "https://www.google.com/")
                .with_child(
                    DomNode::element("h3").with_text("display:flex; background-color:#fff"),
                ),
        ]);
    let results = (1..=count).map(|i| {
        result_block(
            &format!("Budget laptop guide number {i}"),
            &format!("/url?q=https://reviews{i}.example.com/laptops&sa=U"),
            &format!("Snippet {i}"),
        )
    });
    DomNode::element("body")
        .with_child(chrome)
        .with_child(
            DomNode::element("div")
                .with_attr("id", "search")
                .with_child(junk)
                .with_children(results),
        )
}

#[test]
fn extracts_validated_results_in_order() {
    let options = ExtractOptions::default().with_page_url(RESULTS_URL);
    let outcome = extract(&results_page(3), SelectorHint::SearchResults, &options);

    assert_eq!(outcome.strategy, Some("attribute"));
    assert_eq!(outcome.records.len(), 3);
    assert!(outcome.rejected >= 1, "css junk must be rejected");
    for (idx, record) in outcome.records.iter().enumerate() {
        let n = idx + 1;
        assert_eq!(record.rank, n as u32);
        assert_eq!(record.name, format!("Budget laptop guide number {n}"));
        assert_eq!(record.url, format!("https://reviews{n}.example.com/laptops"));
        assert_eq!(record.description, format!("Snippet {n}"));
    }
}

#[test]
fn caps_results_and_continues_rank_sequence() {
    let options = ExtractOptions {
        max_results: 10,
        ..ExtractOptions::default()
    }
    .with_page_url(RESULTS_URL)
    .with_first_rank(4);
    let outcome = extract(&results_page(14), SelectorHint::SearchResults, &options);

    assert_eq!(outcome.records.len(), 10);
    assert_eq!(outcome.records.first().map(|r| r.rank), Some(4));
    assert_eq!(outcome.records.last().map(|r| r.rank), Some(13));
}

#[test]
fn non_results_hint_never_falls_back_to_generic_scraping() {
    let options = ExtractOptions::default().with_page_url("https://example.com");
    let outcome = extract(&results_page(3), SelectorHint::Page, &options);
    assert!(outcome.records.is_empty());
    assert!(outcome.strategy.is_none());
}

#[test]
fn falls_through_to_heading_strategy() {
    let page = DomNode::element("body").with_child(
        DomNode::element("article").with_children([
            DomNode::element("h2").with_text("Quietest noise-cancelling headphones"),
            DomNode::element("p").with_text("Our lab measured twelve models."),
            DomNode::element("a").with_attr("href", "https://audio.example.org/review"),
        ]),
    );
    let options = ExtractOptions::default().with_page_url(RESULTS_URL);
    let outcome = extract(&page, SelectorHint::SearchResults, &options);

    assert_eq!(outcome.strategy, Some("heading_link"));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].url, "https://audio.example.org/review");
    assert_eq!(
        outcome.records[0].description,
        "Our lab measured twelve models."
    );
}

#[test]
fn empty_page_yields_nothing() {
    let outcome = extract(
        &DomNode::element("body"),
        SelectorHint::SearchResults,
        &ExtractOptions::default(),
    );
    assert!(outcome.records.is_empty());
}
