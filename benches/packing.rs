//! Packing and full-pipeline benchmarks over a latin-1 sized glyph set.
//!
//! Glyph sizes come from the in-memory test source, so no font file is needed.

use criterion::{criterion_group, criterion_main, Criterion};
use glyphatlas::{
    generate, test_support::MemoryGlyphSource, CharSet, CornerPacker, Encoding, FieldConfig,
    Packer, PackerConfig, RectRequest, ShelfPacker,
};
use std::hint::black_box;

/// 256 rects shaped like the glyphs of a 48px font
fn glyph_rects() -> Vec<RectRequest> {
    (0..256u32)
        .map(|cp| {
            let w = 1 + (cp * 7) % 40;
            let h = 1 + (cp * 13) % 48;
            RectRequest::new(cp as usize, w, h)
        })
        .collect()
}

fn bench_packers(c: &mut Criterion) {
    let rects = glyph_rects();
    let shelf = ShelfPacker::new(PackerConfig::with_max_width(512));
    let corner = CornerPacker::new(PackerConfig::with_max_width(512));

    let packed = shelf.pack(&rects).expect("shelf packing");
    println!(
        "\nshelf: {}x{} ({:.1}% coverage)",
        packed.width,
        packed.height,
        packed.coverage() * 100.0
    );
    let packed = corner.pack(&rects).expect("corner packing");
    println!(
        "corner: {}x{} ({:.1}% coverage)",
        packed.width,
        packed.height,
        packed.coverage() * 100.0
    );

    c.bench_function("shelf_pack_256", |b| {
        b.iter(|| black_box(shelf.pack(black_box(&rects))))
    });
    c.bench_function("corner_pack_256", |b| {
        b.iter(|| black_box(corner.pack(black_box(&rects))))
    });
}

fn bench_generate(c: &mut Criterion) {
    let source = MemoryGlyphSource::new();
    let charset = CharSet::from_encoding(Encoding::Latin1);
    let packer = ShelfPacker::new(PackerConfig::with_max_width(1024));
    let fields = FieldConfig::default();

    c.bench_function("generate_latin1_48px", |b| {
        b.iter(|| {
            let font = generate(&source, &charset, 48, &packer, &fields).expect("generate");
            black_box(font.description_bytes(&fields))
        })
    });
}

criterion_group!(benches, bench_packers, bench_generate);
criterion_main!(benches);
