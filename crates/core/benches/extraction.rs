use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fieldprobe_core::{
    Document, ExtractConfig, FragmentExtractor, SearchMode, TextQuery, find_text_nodes, normalized,
};

/// Repeats the catalog rows until the page holds `rows` fields.
fn synthetic_catalog(rows: usize) -> String {
    let mut html = String::from("<html><body><ul class=\"catalog\">");
    for i in 0..rows {
        html.push_str(&format!(
            "<li class=\"item\"><span>Year published</span><!-- r{} --><span>{}</span></li>",
            i,
            2000 + (i % 25)
        ));
    }
    html.push_str("</ul></body></html>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let book = std::fs::read_to_string("../../tests/fixtures/book.html").unwrap();
    let large = synthetic_catalog(2_000);

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("book", "1KB"), &book, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("catalog", "2000 rows"), &large, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_match(c: &mut Criterion) {
    let doc = Document::parse(&synthetic_catalog(2_000));
    let query = TextQuery::exact("2020");

    c.bench_function("find_text_nodes", |b| b.iter(|| find_text_nodes(black_box(&doc), black_box(&query))));
}

fn bench_normalize(c: &mut Criterion) {
    let doc = Document::parse(&synthetic_catalog(2_000));

    c.bench_function("normalize", |b| b.iter(|| normalized(black_box(&doc))));
}

fn bench_extraction(c: &mut Criterion) {
    let doc = Document::parse(&synthetic_catalog(500));

    let mut group = c.benchmark_group("extraction");
    for mode in [SearchMode::Text, SearchMode::Element, SearchMode::Cleaned] {
        let extractor = FragmentExtractor::with_config(ExtractConfig::builder().search_mode(mode).build());
        group.bench_with_input(BenchmarkId::new("all_matches", mode), &doc, |b, doc| {
            b.iter(|| extractor.extract_from_document(black_box(doc), "Year published", "2020"))
        });
    }

    let first = FragmentExtractor::with_config(ExtractConfig::builder().all_matches(false).build());
    group.bench_with_input(BenchmarkId::new("first_match", SearchMode::Text), &doc, |b, doc| {
        b.iter(|| first.extract_from_document(black_box(doc), "Year published", "2020"))
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_match, bench_normalize, bench_extraction);
criterion_main!(benches);
