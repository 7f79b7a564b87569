//! User-facing messages and the startup banner.

use crate::consts::{HOMEPAGE, REPO};
use crate::lookup::LookupOutcome;

/// Separator between meanings on the result line.
pub const MEANING_SEPARATOR: &str = "  /  ";

pub const NO_WORD_MESSAGE: &str = "검색할 단어를 선택하거나 커서를 단어 위에 놓으세요.";
pub const NO_DOCUMENT_MESSAGE: &str = "텍스트 편집기가 활성화되어 있지 않습니다.";

/// The one-line message for an outcome.
pub fn render(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::NoWord => NO_WORD_MESSAGE.to_string(),
        LookupOutcome::Found { word, meanings } => {
            format!("'{word}'의 뜻: {}", meanings.join(MEANING_SEPARATOR))
        }
        LookupOutcome::NotFound { word } => format!("'{word}'에 대한 뜻을 찾을 수 없습니다."),
        LookupOutcome::Failed { error, .. } => format!("크롤링 중 오류 발생: {error}"),
        LookupOutcome::Cancelled { word } => format!("'{word}' 검색이 취소되었습니다."),
    }
}

/// The outcome as a single-line JSON object.
pub fn render_json(outcome: &LookupOutcome) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|e| {
        serde_json::json!({ "status": "failed", "error": e.to_string() }).to_string()
    })
}

/// Session details shown when the REPL starts.
pub struct BannerInfo<'a> {
    pub source: &'a str,
    pub search_url: &'a str,
    pub wait_timeout_secs: u64,
    pub max_meanings: usize,
    pub db_path: &'a str,
}

/// Print the REPL banner.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             E N G D I C T             ║
   ║     english words, korean meanings    ║
   ╚═══════════════════════════════════════╝

   version   {}
   home      {}
   repo      {}
   source    {}
   search    {}
   wait      {}s
   meanings  {}
   settings  {}

   type a word to look it up, /help for commands
"#,
        env!("CARGO_PKG_VERSION"),
        HOMEPAGE,
        REPO,
        info.source,
        info.search_url,
        info.wait_timeout_secs,
        info.max_meanings,
        info.db_path,
    );
}
