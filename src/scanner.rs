//! Candidate discovery in handler source text.
//!
//! A candidate is any name reached through a two-level chained access on the handler's
//! receiver: with the default syntax, `$this->mailer->send()` yields `mailer`. The scan is
//! purely textual; no syntax tree is built.
//!
//! When a method name is given the scan is narrowed to that method's body first. The
//! window starts after the opening brace of the method's signature and ends at whichever
//! comes first: the next occurrence of the method keyword (named or anonymous) or the
//! brace that closes the body. A method that contains a closure is therefore cut short at
//! the closure. If no window can be found the whole text is scanned.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::config::SyntaxConfig;
use crate::error::{AutowireError, Result};
use crate::types::CandidateName;

const IDENTIFIER: &str = r"[A-Za-z_][A-Za-z0-9_]*";

static DEFAULT_SCANNER: Lazy<Scanner> = Lazy::new(|| {
    Scanner::new(&SyntaxConfig::default()).expect("default scan syntax compiles")
});

/// Scans with the default handler syntax.
pub fn scan(source: &str, method: Option<&str>) -> Candidates {
    DEFAULT_SCANNER.scan(source, method)
}

/// Ordered, de-duplicated candidates from one scan. Consumed once.
#[derive(Debug)]
pub struct Candidates {
    inner: std::vec::IntoIter<CandidateName>,
}

impl Iterator for Candidates {
    type Item = CandidateName;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Candidates {}

#[derive(Debug, Clone)]
pub struct Scanner {
    access: Regex,
    receiver_starts_with_word: bool,
    method_keyword: String,
}

impl Scanner {
    pub fn new(syntax: &SyntaxConfig) -> Result<Self> {
        if syntax.method_keyword.trim().is_empty() {
            return Err(AutowireError::Syntax("empty method keyword".to_string()));
        }
        let pattern = format!(
            "{receiver}{accessor}({ident}){accessor}",
            receiver = regex::escape(&syntax.receiver),
            accessor = regex::escape(&syntax.accessor),
            ident = IDENTIFIER,
        );
        let access = Regex::new(&pattern)
            .map_err(|e| AutowireError::Syntax(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            access,
            receiver_starts_with_word: syntax.receiver.chars().next().map_or(false, is_word_char),
            method_keyword: syntax.method_keyword.trim().to_string(),
        })
    }

    pub fn scan(&self, source: &str, method: Option<&str>) -> Candidates {
        let window = match method {
            Some(method) => match self.method_window(source, method) {
                Some(body) => body,
                None => {
                    debug!("No window found for method {}; scanning whole source", method);
                    source
                }
            },
            None => source,
        };

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for captures in self.access.captures_iter(window) {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            // `notthis->a->b` must not match receiver `this`
            if self.receiver_starts_with_word
                && window[..whole.start()].chars().next_back().map_or(false, is_word_char)
            {
                continue;
            }
            if let Some(name) = captures.get(1) {
                if seen.insert(name.as_str()) {
                    found.push(CandidateName::new(name.as_str()));
                }
            }
        }

        debug!("Scan found {} candidate(s)", found.len());
        Candidates {
            inner: found.into_iter(),
        }
    }

    /// The body text of `method`, or `None` if its signature or body cannot be located.
    /// Method names compare case-insensitively.
    pub fn method_window<'a>(&self, source: &'a str, method: &str) -> Option<&'a str> {
        let body_start = self
            .keyword_positions(source)
            .find_map(|pos| self.body_start_if_named(source, pos, method))?;

        let rest = &source[body_start..];
        let next_keyword = self.keyword_positions(rest).next();
        let closing = closing_brace(rest);

        let end = match (next_keyword, closing) {
            (Some(k), Some(c)) => k.min(c),
            (Some(k), None) => k,
            (None, Some(c)) => c,
            (None, None) => return None,
        };
        Some(&rest[..end])
    }

    /// Byte offsets of the method keyword where it stands as a whole word followed by
    /// whitespace or an opening parenthesis.
    fn keyword_positions<'a>(&'a self, text: &'a str) -> impl Iterator<Item = usize> + 'a {
        let keyword = self.method_keyword.as_str();
        text.match_indices(keyword).filter_map(move |(pos, _)| {
            let before_ok = text[..pos].chars().next_back().map_or(true, |c| !is_word_char(c));
            let after = text[pos + keyword.len()..].chars().next();
            let after_ok = matches!(after, Some(c) if c.is_whitespace() || c == '(');
            (before_ok && after_ok).then_some(pos)
        })
    }

    /// If the keyword at `pos` opens a signature named `method`, returns the offset just
    /// past the body's opening brace.
    fn body_start_if_named(&self, source: &str, pos: usize, method: &str) -> Option<usize> {
        let mut cursor = pos + self.method_keyword.len();
        cursor += leading_whitespace(&source[cursor..]);

        let name_len = source[cursor..]
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map_or(source.len() - cursor, |(i, _)| i);
        if name_len == 0 || !source[cursor..cursor + name_len].eq_ignore_ascii_case(method) {
            return None;
        }
        cursor += name_len;
        cursor += leading_whitespace(&source[cursor..]);

        if !source[cursor..].starts_with('(') {
            return None;
        }
        cursor += matching_paren(&source[cursor..])? + 1;

        // Anything may sit between the parameter list and the body (return types),
        // but a `;` means there is no body.
        for (i, c) in source[cursor..].char_indices() {
            match c {
                '{' => return Some(cursor + i + 1),
                ';' => return None,
                _ => {}
            }
        }
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Offset of the `)` matching the `(` at the start of `text`.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Offset of the `}` closing a body whose `{` precedes `text`.
fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(candidates: Candidates) -> Vec<String> {
        candidates.map(|c| c.as_str().to_string()).collect()
    }

    fn dotted() -> Scanner {
        Scanner::new(&SyntaxConfig {
            receiver: "context".to_string(),
            accessor: ".".to_string(),
            method_keyword: "function".to_string(),
        })
        .unwrap()
    }

    const USERS_CONTROLLER: &str = r#"
class Users extends Controller {
    function index() {
        $this->user_model->all();
        $this->template->render('users/index');
    }

    function edit($id) {
        $user = $this->user_model->find($id);
        $this->mailer->send($user);
        if ($this->input->post()) {
            $this->session->flash('saved');
        }
    }

    function delete($id) {
        $this->audit_log->write($id);
    }
}
"#;

    #[test]
    fn test_no_chained_access_yields_nothing() {
        let source = "function index() { $this->title = 'x'; echo $user->name; }";
        assert_eq!(scan(source, None).count(), 0);
        assert_eq!(scan("", None).count(), 0);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let source = "$this->db->get(); $this->cache->get(); $this->db->put();";
        assert_eq!(names(scan(source, None)), vec!["db", "cache"]);
    }

    #[test]
    fn test_case_distinct_forms_are_distinct_candidates() {
        let source = "$this->Mailer->send(); $this->mailer->send();";
        assert_eq!(names(scan(source, None)), vec!["Mailer", "mailer"]);
    }

    #[test]
    fn test_whole_file_without_method() {
        assert_eq!(
            names(scan(USERS_CONTROLLER, None)),
            vec!["user_model", "template", "mailer", "input", "session", "audit_log"]
        );
    }

    #[test]
    fn test_method_narrowing_excludes_siblings() {
        assert_eq!(
            names(scan(USERS_CONTROLLER, Some("edit"))),
            vec!["user_model", "mailer", "input", "session"]
        );
    }

    #[test]
    fn test_last_method_ends_at_closing_brace() {
        assert_eq!(names(scan(USERS_CONTROLLER, Some("delete"))), vec!["audit_log"]);
    }

    #[test]
    fn test_method_lookup_ignores_case() {
        assert_eq!(names(scan(USERS_CONTROLLER, Some("INDEX"))), vec!["user_model", "template"]);
    }

    #[test]
    fn test_missing_method_falls_back_to_whole_text() {
        assert_eq!(names(scan(USERS_CONTROLLER, Some("missing"))).len(), 6);
    }

    #[test]
    fn test_method_name_prefix_does_not_match() {
        let source =
            "function editAll() { $this->bulk->run(); } function edit() { $this->one->run(); }";
        assert_eq!(names(scan(source, Some("edit"))), vec!["one"]);
    }

    #[test]
    fn test_nested_closure_cuts_window_short() {
        // Known imprecision: the window stops at the closure's keyword.
        let source = r#"
    function index() {
        $this->users->all();
        $list = array_map(function ($u) { return $u; }, $list);
        $this->mailer->send($list);
    }
"#;
        assert_eq!(names(scan(source, Some("index"))), vec!["users"]);
    }

    #[test]
    fn test_abstract_signature_has_no_window() {
        let scanner = Scanner::new(&SyntaxConfig::default()).unwrap();
        assert!(scanner
            .method_window("abstract function run($x); $this->a->b();", "run")
            .is_none());
    }

    #[test]
    fn test_custom_syntax() {
        let source = "function handle(req) { context.mailer.send(req); context.title = 1; }";
        assert_eq!(names(dotted().scan(source, Some("handle"))), vec!["mailer"]);
    }

    #[test]
    fn test_receiver_must_start_a_word() {
        let source = "subcontext.mailer.send(); context.cache.get();";
        assert_eq!(names(dotted().scan(source, None)), vec!["cache"]);
    }

    #[test]
    fn test_keyword_inside_identifier_is_not_a_boundary() {
        let source = "function index() { $this->a->x(); my_function($y); $this->b->y(); }";
        assert_eq!(names(scan(source, Some("index"))), vec!["a", "b"]);
    }
}
