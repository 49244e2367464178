use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::parser::ClassifiedLine;

/// Characters Windows forbids in file names; the artifact name is built
/// from the page title, which may contain any of them.
static ILLEGAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());

const ARTIFACT_SUFFIX: &str = "_edit_page_content.csv";
const HEADER: [&str; 4] = ["line_number", "content", "category", "character"];
/// UTF-8 byte order mark, kept so spreadsheet tools pick the right encoding.
const BOM: &[u8] = b"\xef\xbb\xbf";

pub fn sanitize_title(title: &str) -> String {
    ILLEGAL_RE.replace_all(title, "_").into_owned()
}

pub fn artifact_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{}{}", sanitize_title(title), ARTIFACT_SUFFIX))
}

/// Serialize one page's records to its CSV artifact. Distinct titles can
/// collide after sanitization; an existing artifact is replaced with a
/// warning rather than refused.
pub fn write_page(
    output_dir: &Path,
    title: &str,
    lines: &[ClassifiedLine],
) -> Result<PathBuf> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
        info!("Created output directory {}", output_dir.display());
    }

    let path = artifact_path(output_dir, title);
    if path.exists() {
        warn!("Overwriting existing artifact {}", path.display());
    }

    let mut file =
        File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(BOM)
        .with_context(|| format!("writing {}", path.display()))?;

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    wtr.write_record(HEADER)?;
    for line in lines {
        wtr.serialize(line)?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classify_lines;

    #[test]
    fn sanitize_replaces_every_illegal_character() {
        let title = r#"a\b/c*d?e:f"g<h>i|j"#;
        assert_eq!(sanitize_title(title), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn sanitize_keeps_cjk_and_interpuncts() {
        assert_eq!(sanitize_title("初花剑客行•剑斗"), "初花剑客行•剑斗");
    }

    #[test]
    fn distinct_titles_may_collide_after_sanitization() {
        let dir = Path::new("out");
        assert_eq!(
            artifact_path(dir, "晖长石号/航行日志"),
            artifact_path(dir, "晖长石号_航行日志"),
        );
    }

    #[test]
    fn artifact_name_has_fixed_suffix() {
        let path = artifact_path(Path::new("out"), "测试页");
        assert_eq!(
            path,
            Path::new("out").join("测试页_edit_page_content.csv")
        );
    }

    #[test]
    fn artifact_starts_with_bom_and_exact_header() {
        let tmp = tempfile::tempdir().unwrap();
        let lines = classify_lines("三月七：你好");
        let path = write_page(tmp.path(), "测试页", &lines).unwrap();

        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("line_number,content,category,character")
        );
    }

    #[test]
    fn round_trip_reproduces_records() {
        let tmp = tempfile::tempdir().unwrap();
        let source = "三月七：你好\n\n选项A\n剧情：后续发展\nabc：xyz";
        let lines = classify_lines(source);
        let path = write_page(tmp.path(), "往返", &lines).unwrap();

        let bytes = fs::read(path).unwrap();
        let mut rdr = csv::Reader::from_reader(&bytes[BOM.len()..]);
        let parsed: Vec<ClassifiedLine> =
            rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, lines);
    }

    #[test]
    fn nested_output_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data").join("march7th");
        let lines = classify_lines("姬子：出发。");
        let path = write_page(&dir, "嵌套", &lines).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn rewrite_replaces_previous_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let first = classify_lines("三月七：第一版");
        let second = classify_lines("三月七：第二版");
        write_page(tmp.path(), "重写", &first).unwrap();
        let path = write_page(tmp.path(), "重写", &second).unwrap();

        let bytes = fs::read(path).unwrap();
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("第二版"));
        assert!(!text.contains("第一版"));
    }

    #[test]
    fn empty_page_still_gets_a_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_page(tmp.path(), "空页", &[]).unwrap();
        let bytes = fs::read(path).unwrap();
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.trim_end(), "line_number,content,category,character");
    }
}
