//! Compilation performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use notac::*;
use std::fs;
use tempfile::TempDir;

fn bench_simple_compilation(c: &mut Criterion) {
    let content = r#"
App {
    Text { text: "Hello World"; color: white }
}
"#;

    c.bench_function("simple_compilation", |b| {
        b.iter(|| compile_source(black_box(content), "simple.nota").unwrap())
    });
}

fn bench_template_expansion(c: &mut Criterion) {
    let mut content = String::from(
        "Item Card {\n  padding: 8; radius: 4\n  Text { id: title; text: \"Card\" }\n  Rect { id: body; height: 40 }\n}\nApp {\n  Col {\n",
    );
    for i in 0..500 {
        content.push_str(&format!(
            "    Card {{ title.text: \"Card {}\"; body.color: red; width: {} * 2 + 10 }}\n",
            i, i
        ));
    }
    content.push_str("  }\n}\n");

    c.bench_function("template_expansion", |b| {
        b.iter(|| compile_source(black_box(&content), "cards.nota").unwrap())
    });
}

fn bench_large_file_compilation(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("large.nota");
    let output_path = temp_dir.path().join("large.html");

    let mut content = String::from("App {\n  Col { spacing: 4\n");
    for i in 0..1000 {
        content.push_str(&format!("    Text {{ text: \"Item {}\" }}\n", i));
    }
    content.push_str("  }\n}\n");

    fs::write(&input_path, content).unwrap();

    c.bench_function("large_file_compilation", |b| {
        b.iter(|| {
            compile_file(
                black_box(input_path.to_str().unwrap()),
                black_box(output_path.to_str().unwrap()),
            )
            .unwrap()
        })
    });
}

fn bench_style_modes(c: &mut Criterion) {
    let content = "App { for (row in rows) { Row { Text { text: row.label } } }\n Rect { width: parent.width - 20px; x: 5 } }";

    let mut group = c.benchmark_group("style_modes");
    for (name, mode) in [("stylesheet", StyleMode::Stylesheet), ("inline", StyleMode::Inline)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let options = CompilerOptions {
                    style_mode: mode,
                    ..CompilerOptions::default()
                };
                compile_source_with_options(black_box(content), "modes.nota", options).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_simple_compilation,
    bench_template_expansion,
    bench_large_file_compilation,
    bench_style_modes
);
criterion_main!(benches);
