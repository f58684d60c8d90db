//! Terminal output for gists, lists and the profile. Code is highlighted
//! with syntect when colour is on.

use std::fmt;
use std::sync::LazyLock;

use owo_colors::OwoColorize;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

use quickgist_core::models::gist::format_file_size;

use crate::list::GistSummary;
use crate::profile::Profile;
use crate::submission::Submission;
use crate::view::GistView;

/// Theme from syntect's bundled set used for coloured code.
const THEME: &str = "base16-ocean.dark";

/// Content at or above this size is printed without highlighting.
pub const HIGHLIGHT_PLAIN_THRESHOLD: usize = 256 * 1024;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Map a language hint to the token syntect looks syntaxes up by.
pub fn syntax_token(language: &str) -> String {
    let lang = language.trim().to_ascii_lowercase();
    let token = match lang.as_str() {
        "python" => "py",
        "javascript" | "jsx" => "js",
        "typescript" => "ts",
        "markdown" => "md",
        "csharp" => "cs",
        "c++" => "cpp",
        "ruby" => "rb",
        "shell" | "bash" | "zsh" => "sh",
        "plaintext" | "plain" | "text" => "txt",
        "rust" => "rs",
        _ => return lang,
    };
    token.to_string()
}

/// Highlighter for `language`, or `None` when the content should be printed
/// plain. Unknown languages use the plain-text syntax.
fn highlighter(language: &str, content_len: usize) -> Option<HighlightLines<'static>> {
    if content_len >= HIGHLIGHT_PLAIN_THRESHOLD {
        return None;
    }
    let themes: &'static ThemeSet = &THEMES;
    let theme = themes.themes.get(THEME)?;
    let syntaxes: &'static SyntaxSet = &SYNTAXES;
    let syntax = syntaxes
        .find_syntax_by_token(&syntax_token(language))
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
    Some(HighlightLines::new(syntax, theme))
}

/// A gist with a header, its content under a line-number gutter and the
/// attached file, if any.
pub struct GistDetail<'a> {
    pub view: &'a GistView,
    pub enable_color: bool,
}

impl fmt::Display for GistDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gist = &self.view.gist;

        if self.enable_color {
            write!(f, "{}", gist.title.bold())?;
            if gist.is_draft {
                write!(f, " {}", "[draft]".yellow())?;
            }
        } else {
            write!(f, "{}", gist.title)?;
            if gist.is_draft {
                write!(f, " [draft]")?;
            }
        }
        writeln!(f)?;

        let author = gist.owner().unwrap_or("anonymous");
        let meta = format!("{} · {} · {}", author, gist.created_at, self.view.language);
        if self.enable_color {
            writeln!(f, "{}", meta.bright_black())?;
        } else {
            writeln!(f, "{meta}")?;
        }

        if !gist.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", gist.description)?;
        }

        if !gist.content.is_empty() {
            writeln!(f)?;
            write_code(f, &gist.content, self.view.language, self.enable_color)?;
        }

        if let Some(file) = &self.view.file {
            writeln!(f)?;
            let action = if file.previewable { "preview" } else { "download" };
            if self.enable_color {
                writeln!(f, "{} {} ({action})", "File:".bold(), file.name)?;
                writeln!(f, "  {}", file.url.underline())?;
            } else {
                writeln!(f, "File: {} ({action})", file.name)?;
                writeln!(f, "  {}", file.url)?;
            }
        }
        Ok(())
    }
}

fn write_code(
    f: &mut fmt::Formatter<'_>,
    content: &str,
    language: &str,
    enable_color: bool,
) -> fmt::Result {
    let width = LinesWithEndings::from(content).count().to_string().len();
    let mut lines = if enable_color {
        highlighter(language, content.len())
    } else {
        None
    };

    for (i, line) in LinesWithEndings::from(content).enumerate() {
        let number = format!("{:>width$}", i + 1);
        let text = line.trim_end_matches(['\n', '\r']);
        if !enable_color {
            writeln!(f, "{number} │ {text}")?;
            continue;
        }

        let ranges = lines
            .as_mut()
            .and_then(|h| h.highlight_line(line, &SYNTAXES).ok());
        let code = match ranges {
            Some(ranges) => {
                let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
                format!("{}\x1b[0m", escaped.trim_end_matches(['\n', '\r']))
            }
            None => text.to_string(),
        };
        writeln!(f, "{} {} {code}", number.bright_black(), "│".bright_black())?;
    }
    Ok(())
}

pub struct SummaryTable<'a> {
    pub summaries: &'a [GistSummary],
    pub enable_color: bool,
}

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in self.summaries {
            let mut badges = String::new();
            if s.is_draft {
                badges.push_str(" [draft]");
            }
            if s.has_file {
                badges.push_str(" [file]");
            }

            if self.enable_color {
                writeln!(
                    f,
                    "{} {}{}",
                    s.created_date.bright_black(),
                    s.title.bold(),
                    badges.yellow()
                )?;
            } else {
                writeln!(f, "{} {}{}", s.created_date, s.title, badges)?;
            }
            if !s.description.is_empty() {
                writeln!(f, "    {}", s.description)?;
            }
            if self.enable_color {
                writeln!(f, "    {}", s.view_url.bright_blue())?;
            } else {
                writeln!(f, "    {}", s.view_url)?;
            }
        }
        Ok(())
    }
}

pub struct ProfileView<'a> {
    pub profile: &'a Profile,
    pub enable_color: bool,
}

impl fmt::Display for ProfileView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.profile;
        if self.enable_color {
            writeln!(f, "{} {}", "User:".bold(), p.user_id.bright_blue())?;
        } else {
            writeln!(f, "User: {}", p.user_id)?;
        }
        writeln!(f, "Gists: {} ({} drafts)", p.gist_count, p.draft_count)?;
        if !p.recent.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recent:")?;
            write!(
                f,
                "{}",
                SummaryTable {
                    summaries: &p.recent,
                    enable_color: self.enable_color,
                }
            )?;
        }
        Ok(())
    }
}

pub struct SubmissionNotice<'a> {
    pub submission: &'a Submission,
    pub enable_color: bool,
}

impl fmt::Display for SubmissionNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gist = &self.submission.gist;
        let who = if gist.is_anonymous() {
            "anonymously"
        } else {
            "to your account"
        };
        if self.enable_color {
            writeln!(f, "{} {}", "Gist created".green().bold(), who)?;
            writeln!(f, "{}", self.submission.share_url.bright_blue())?;
            writeln!(f, "{} quickgist view {}", "View now:".bold(), gist.snippet_id)?;
        } else {
            writeln!(f, "Gist created {who}")?;
            writeln!(f, "{}", self.submission.share_url)?;
            writeln!(f, "View now: quickgist view {}", gist.snippet_id)?;
        }
        Ok(())
    }
}

/// One-line description of a file about to be uploaded.
pub fn file_line(name: &str, size: usize) -> String {
    format!("{name} ({})", format_file_size(size))
}
