//! Benchmarks for undocx decoding performance.
//!
//! Run with: cargo bench
//!
//! Synthetic packages scale the paragraph count; every tenth paragraph
//! carries a field and every fiftieth is followed by a merged table.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;

const TABLE: &str = r#"
    <w:tbl>
      <w:tr>
        <w:tc><w:tcPr><w:gridSpan w:val="2"/><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>Merged</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>Value</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:tcPr><w:gridSpan w:val="2"/><w:vMerge/></w:tcPr><w:p/></w:tc>
        <w:tc><w:p><w:r><w:t>Value</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>"#;

/// Creates a synthetic DOCX document with the given number of paragraphs.
fn create_test_docx(paragraph_count: usize) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    // word/_rels/document.xml.rels
    zip.start_file("word/_rels/document.xml.rels", options)
        .unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/>
</Relationships>"#,
    )
    .unwrap();

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>"#,
    );

    for i in 0..paragraph_count {
        if i % 10 == 0 {
            content.push_str(&format!(
                r#"
    <w:p>
      <w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Field {} </w:t></w:r>
      <w:r><w:fldChar w:fldCharType="begin"/></w:r>
      <w:r><w:instrText xml:space="preserve"> HYPERLINK "https://example.com/" </w:instrText></w:r>
      <w:r><w:fldChar w:fldCharType="separate"/></w:r>
      <w:r><w:t>link text</w:t></w:r>
      <w:r><w:fldChar w:fldCharType="end"/></w:r>
    </w:p>"#,
                i
            ));
        } else {
            content.push_str(&format!(
                r#"
    <w:p>
      <w:r>
        <w:t>This is paragraph {} with some test content for benchmarking purposes.</w:t>
      </w:r>
      <w:hyperlink r:id="rId1"><w:r><w:t> (source)</w:t></w:r></w:hyperlink>
    </w:p>"#,
                i
            ));
        }
        if i % 50 == 49 {
            content.push_str(TABLE);
        }
    }

    content.push_str(
        r#"
  </w:body>
</w:document>"#,
    );

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();

    zip.finish().unwrap();
    buffer
}

/// Benchmark DOCX decoding at various sizes.
fn bench_docx_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("docx_decoding");

    for para_count in [10, 100, 500, 1000].iter() {
        let data = create_test_docx(*para_count);
        let size = data.len() as u64;

        group.throughput(Throughput::Bytes(size));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &data,
            |b, data| {
                b.iter(|| {
                    let _ = undocx::decode_bytes(black_box(data));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark JSON serialization of a decoded document.
fn bench_json_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_serialization");

    for para_count in [10, 100, 500].iter() {
        let data = create_test_docx(*para_count);
        let document = undocx::decode_bytes(&data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &document,
            |b, doc| {
                b.iter(|| {
                    let _ = black_box(doc).to_json_compact();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark text extraction.
fn bench_text_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_extraction");

    for para_count in [10, 100, 500, 1000].iter() {
        let data = create_test_docx(*para_count);
        let document = undocx::decode_bytes(&data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &document,
            |b, doc| {
                b.iter(|| {
                    let _ = black_box(doc).plain_text();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_docx_decoding,
    bench_json_serialization,
    bench_text_extraction,
);
criterion_main!(benches);
