//! self-contained HTML rendering (C7)
use crate::domain::{Chunk, ListItem, TextFragment};
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

pub const OUTPUT_FILENAME: &str = "post.html";

/// render `chunks` into `destination_dir/post.html`. cancellation mid-write
/// removes the partial file before the cancellation error propagates (§4.7,
/// §8 invariant 6).
pub async fn render(
    destination_dir: &Path,
    chunks: &[Chunk],
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let html = render_to_string(chunks);
    let path = destination_dir.join(OUTPUT_FILENAME);

    let result: Result<()> = async {
        if cancel.is_cancelled() {
            return Err(AppError::DownloadCancelledError);
        }
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(html.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => Ok(path),
        Err(e) => {
            let _ = tokio::fs::remove_file(&path).await;
            Err(e)
        }
    }
}

/// pure rendering function: same chunk list always produces byte-identical
/// output (§8 invariant 8)
pub fn render_to_string(chunks: &[Chunk]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n");

    for chunk in chunks {
        render_chunk(chunk, &mut out);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_chunk(chunk: &Chunk, out: &mut String) {
    match chunk {
        Chunk::Text(fragments) => render_text_fragments(fragments, out),
        Chunk::Image { local_path } => {
            let alt = filename_of(local_path);
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                escape(local_path),
                escape(&alt)
            ));
        }
        Chunk::File { filename, local_path } => {
            out.push_str(&format!(
                "<p><a href=\"{}\">{}</a></p>\n",
                escape(local_path),
                escape(filename)
            ));
        }
        Chunk::PlatformVideo { local_path, .. } | Chunk::ExternalVideo { local_path } => {
            if let Some(path) = local_path {
                out.push_str(&format!(
                    "<video controls src=\"{}\"></video>\n",
                    escape(path)
                ));
            }
        }
        Chunk::Audio { local_path, title } => {
            if let Some(path) = local_path {
                out.push_str(&format!(
                    "<audio controls src=\"{}\">{}</audio>\n",
                    escape(path),
                    escape(title)
                ));
            }
        }
        Chunk::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>\n"));
            for item in items {
                render_list_item(item, out);
            }
            out.push_str(&format!("</{tag}>\n"));
        }
    }
}

fn render_list_item(item: &ListItem, out: &mut String) {
    out.push_str("<li>");
    for fragment in &item.fragments {
        render_fragment(fragment, out);
    }
    if !item.children.is_empty() {
        out.push_str("<ul>\n");
        for child in &item.children {
            render_list_item(child, out);
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</li>\n");
}

fn render_text_fragments(fragments: &[TextFragment], out: &mut String) {
    let mut paragraph_open = false;

    for fragment in fragments {
        if fragment.is_new_line() {
            if paragraph_open {
                out.push_str("</p>\n");
                paragraph_open = false;
            }
            continue;
        }

        if fragment.header_level > 0 {
            if paragraph_open {
                out.push_str("</p>\n");
                paragraph_open = false;
            }
            let level = fragment.header_level.min(6);
            out.push_str(&format!("<h{level}>"));
            render_fragment_inner(fragment, out);
            out.push_str(&format!("</h{level}>\n"));
            continue;
        }

        if !paragraph_open {
            out.push_str("<p>");
            paragraph_open = true;
        }
        render_fragment(fragment, out);
    }

    if paragraph_open {
        out.push_str("</p>\n");
    }
}

fn render_fragment(fragment: &TextFragment, out: &mut String) {
    if let Some(url) = &fragment.link_url {
        out.push_str(&format!("<a href=\"{}\">", escape(url)));
        render_fragment_inner(fragment, out);
        out.push_str("</a>");
    } else {
        render_fragment_inner(fragment, out);
    }
}

fn render_fragment_inner(fragment: &TextFragment, out: &mut String) {
    let mut open_tags = Vec::new();
    if fragment.bold {
        open_tags.push("b");
    }
    if fragment.italic {
        open_tags.push("i");
    }
    if fragment.underline {
        open_tags.push("u");
    }

    for tag in &open_tags {
        out.push_str(&format!("<{tag}>"));
    }
    out.push_str(&escape(&fragment.text));
    for tag in open_tags.iter().rev() {
        out.push_str(&format!("</{tag}>"));
    }
}

fn filename_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_identical_output_twice() {
        let chunks = vec![Chunk::Text(vec![TextFragment::plain("hello")])];
        assert_eq!(render_to_string(&chunks), render_to_string(&chunks));
    }

    #[test]
    fn header_breaks_paragraph() {
        let chunks = vec![Chunk::Text(vec![
            TextFragment::plain("before"),
            {
                let mut h = TextFragment::plain("Heading");
                h.header_level = 2;
                h
            },
            TextFragment::plain("after"),
        ])];
        let html = render_to_string(&chunks);
        assert!(html.contains("<h2>Heading</h2>"));
        assert!(html.contains("<p>before</p>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn new_line_sentinel_breaks_paragraph() {
        let chunks = vec![Chunk::Text(vec![
            TextFragment::plain("para one"),
            TextFragment::new_line(),
            TextFragment::plain("para two"),
        ])];
        let html = render_to_string(&chunks);
        assert!(html.contains("<p>para one</p>"));
        assert!(html.contains("<p>para two</p>"));
    }

    #[test]
    fn link_wraps_text_in_anchor() {
        let mut fragment = TextFragment::plain("click me");
        fragment.link_url = Some("https://example.com".to_string());
        let html = render_to_string(&[Chunk::Text(vec![fragment])]);
        assert!(html.contains("<a href=\"https://example.com\">click me</a>"));
    }

    #[test]
    fn image_uses_local_filename_as_alt() {
        let html = render_to_string(&[Chunk::Image {
            local_path: "images/cat.png".to_string(),
        }]);
        assert!(html.contains("alt=\"cat.png\""));
        assert!(html.contains("src=\"images/cat.png\""));
    }

    #[test]
    fn escapes_html_special_characters() {
        let html = render_to_string(&[Chunk::Text(vec![TextFragment::plain("<script>&")])]);
        assert!(html.contains("&lt;script&gt;&amp;"));
    }

    #[tokio::test]
    async fn cancellation_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let chunks = vec![Chunk::Text(vec![TextFragment::plain("x")])];
        let err = render(dir.path(), &chunks, &cancel).await.unwrap_err();
        assert!(matches!(err, AppError::DownloadCancelledError));
        assert!(!dir.path().join(OUTPUT_FILENAME).exists());
    }
}
