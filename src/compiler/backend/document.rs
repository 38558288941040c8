//! Assembly of a standalone HTML document from generated fragments

use crate::compiler::backend::codegen::GeneratedOutput;
use crate::compiler::backend::runtime::RUNTIME_JS;
use crate::utils::escape_html;
use std::fmt::Write as _;

const BASE_CSS: &str = "*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
html, body { width: 100%; min-height: 100%; }
.nota-app { font-family: system-ui, sans-serif; min-height: 100vh; }
.nota-row { display: flex; flex-direction: row; }
.nota-col { display: flex; flex-direction: column; }
.nota-rect { display: block; }
.nota-text { display: inline-block; }
.nota-item { display: block; }
.nota-if, .nota-if-then, .nota-if-else { display: contents; }
.nota-for { display: contents; }
";

#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub title: String,
    pub emit_runtime: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            title: "Nota App".to_string(),
            emit_runtime: true,
        }
    }
}

pub fn assemble_document(output: &GeneratedOutput, options: &DocumentOptions) -> String {
    let mut document = String::with_capacity(BASE_CSS.len() + output.html.len() + output.css.len() + output.js.len() + 512);

    document.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    document.push_str("<meta charset=\"UTF-8\">\n");
    document.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(document, "<title>{}</title>", escape_html(&options.title));
    document.push_str("<style>\n");
    document.push_str(BASE_CSS);
    document.push_str(&output.css);
    document.push_str("</style>\n</head>\n");

    let scripts = script_block(output, options);
    let body = output.html.trim();
    match body.strip_suffix("</body>") {
        Some(open) if body.starts_with("<body") => {
            document.push_str(open);
            document.push('\n');
            document.push_str(&scripts);
            document.push_str("</body>\n");
        }
        _ => {
            document.push_str("<body>\n");
            if !body.is_empty() {
                document.push_str(body);
                document.push('\n');
            }
            document.push_str(&scripts);
            document.push_str("</body>\n");
        }
    }

    document.push_str("</html>\n");
    document
}

fn script_block(output: &GeneratedOutput, options: &DocumentOptions) -> String {
    if output.js.is_empty() && !options.emit_runtime {
        return String::new();
    }

    let mut script = String::from("<script>\n");
    if options.emit_runtime {
        script.push_str(RUNTIME_JS);
    }
    if !output.js.is_empty() {
        script.push_str("document.addEventListener('DOMContentLoaded', () => {\n");
        script.push_str(&output.js);
        script.push_str("});\n");
    }
    script.push_str("</script>\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(html: &str, js: &str) -> GeneratedOutput {
        GeneratedOutput {
            html: html.to_string(),
            css: ".nota-e1 { width: 10px; }\n".to_string(),
            js: js.to_string(),
        }
    }

    #[test]
    fn test_generated_body_is_kept() {
        let doc = assemble_document(
            &output("<body class=\"nota-app\"><span class=\"nota-text\">Hi</span></body>", ""),
            &DocumentOptions::default(),
        );
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert_eq!(doc.matches("<body").count(), 1);
        assert!(doc.contains("<body class=\"nota-app\"><span class=\"nota-text\">Hi</span>\n<script>"));
        assert!(doc.contains(".nota-e1 { width: 10px; }"));
        assert!(doc.contains("class NotaComponent"));
        assert!(doc.trim_end().ends_with("</body>\n</html>"));
    }

    #[test]
    fn test_fragment_is_wrapped() {
        let doc = assemble_document(&output("<div class=\"nota-rect\"></div>", ""), &DocumentOptions::default());
        assert!(doc.contains("<body>\n<div class=\"nota-rect\"></div>\n"));
    }

    #[test]
    fn test_scripts_run_after_load() {
        let options = DocumentOptions {
            title: "A <b> title".to_string(),
            emit_runtime: false,
        };
        let doc = assemble_document(&output("<body></body>", "console.log(1);\n"), &options);
        assert!(doc.contains("<title>A &lt;b&gt; title</title>"));
        assert!(!doc.contains("class NotaComponent"));
        assert!(doc.contains("document.addEventListener('DOMContentLoaded', () => {\nconsole.log(1);\n});"));
    }

    #[test]
    fn test_no_script_without_runtime_or_js() {
        let options = DocumentOptions {
            emit_runtime: false,
            ..DocumentOptions::default()
        };
        let doc = assemble_document(&output("<body></body>", ""), &options);
        assert!(!doc.contains("<script>"));
    }
}
