//! Boolean keyword queries for the job and candidate search boxes.
//!
//! Grammar (precedence NOT > AND > OR, adjacent terms are ANDed):
//!
//! ```text
//! or      := and ("OR" and)*
//! and     := unary ("AND"? unary)*
//! unary   := ("NOT" | "-") unary | primary
//! primary := word | "quoted phrase" | "(" or ")"
//! ```
//!
//! Input typed into a search box is never rejected: dangling operators are
//! dropped and unclosed groups or quotes end at the end of input. Groups
//! nested deeper than `MAX_GROUP_DEPTH` lose their extra parentheses, and runs
//! of negations collapse to their parity.

/// Deepest `(` that still opens a group.
pub const MAX_GROUP_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Term(String),
    Not(Box<QueryNode>),
    And(Vec<QueryNode>),
    Or(Vec<QueryNode>),
}

impl QueryNode {
    fn matches(&self, haystack: &str) -> bool {
        match self {
            QueryNode::Term(term) => haystack.contains(term.as_str()),
            QueryNode::Not(inner) => !inner.matches(haystack),
            QueryNode::And(nodes) => nodes.iter().all(|n| n.matches(haystack)),
            QueryNode::Or(nodes) => nodes.iter().any(|n| n.matches(haystack)),
        }
    }
}

/// A parsed search box query. The empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    root: Option<QueryNode>,
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        let tokens = tokenize(input);
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        SearchQuery {
            root: parser.parse_all(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Case-insensitive substring evaluation against `haystack`.
    pub fn matches(&self, haystack: &str) -> bool {
        match &self.root {
            None => true,
            Some(node) => node.matches(&haystack.to_lowercase()),
        }
    }

    /// Like `matches`, over several fields joined together.
    pub fn matches_any_field<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.root.is_none() {
            return true;
        }
        let joined = fields.into_iter().collect::<Vec<_>>().join("\n");
        self.matches(&joined)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Term(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push(Token::LParen);
        } else if c == ')' {
            chars.next();
            tokens.push(Token::RParen);
        } else if c == '"' {
            chars.next();
            let mut phrase = String::new();
            for next in chars.by_ref() {
                if next == '"' {
                    break;
                }
                phrase.push(next);
            }
            let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
            if !phrase.is_empty() {
                tokens.push(Token::Term(phrase.to_lowercase()));
            }
        } else if c == '-' {
            chars.next();
            // "-rust" negates; a lone or trailing dash is ignored
            if chars
                .peek()
                .is_some_and(|n| !n.is_whitespace() && *n != ')')
            {
                tokens.push(Token::Not);
            }
        } else {
            let mut word = String::new();
            while let Some(&n) = chars.peek() {
                if n.is_whitespace() || n == '(' || n == ')' || n == '"' {
                    break;
                }
                word.push(n);
                chars.next();
            }
            tokens.push(match word.as_str() {
                "AND" | "&&" => Token::And,
                "OR" | "||" => Token::Or,
                "NOT" => Token::Not,
                _ => Token::Term(word.to_lowercase()),
            });
        }
    }

    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Top level: anything left after an `or` expression is a stray `)`, skip it and keep going.
    fn parse_all(&mut self) -> Option<QueryNode> {
        let mut parts = Vec::new();
        while self.peek().is_some() {
            if let Some(node) = self.parse_or() {
                parts.push(node);
            }
            if self.peek().is_some() {
                self.advance();
            }
        }
        combine(parts, QueryNode::And)
    }

    fn parse_or(&mut self) -> Option<QueryNode> {
        let mut branches = Vec::new();
        loop {
            if let Some(node) = self.parse_and() {
                branches.push(node);
            }
            if self.peek() == Some(&Token::Or) {
                self.advance();
            } else {
                break;
            }
        }
        combine(branches, QueryNode::Or)
    }

    fn parse_and(&mut self) -> Option<QueryNode> {
        let mut operands = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::Or) | Some(Token::RParen) => break,
                Some(Token::And) => self.advance(),
                Some(_) => {
                    if let Some(node) = self.parse_unary() {
                        operands.push(node);
                    }
                }
            }
        }
        combine(operands, QueryNode::And)
    }

    fn parse_unary(&mut self) -> Option<QueryNode> {
        let mut negations = 0usize;
        while self.peek() == Some(&Token::Not) {
            self.advance();
            negations += 1;
        }
        if negations > 0 && !matches!(self.peek(), Some(Token::Term(_)) | Some(Token::LParen)) {
            return None;
        }
        let inner = self.parse_primary()?;
        if negations % 2 == 1 {
            Some(QueryNode::Not(Box::new(inner)))
        } else {
            Some(inner)
        }
    }

    fn parse_primary(&mut self) -> Option<QueryNode> {
        match self.peek().cloned() {
            Some(Token::Term(term)) => {
                self.advance();
                Some(QueryNode::Term(term))
            }
            Some(Token::LParen) if self.depth >= MAX_GROUP_DEPTH => {
                // Too deep: drop the paren, the caller's loop picks up what follows.
                self.advance();
                None
            }
            Some(Token::LParen) => {
                self.advance();
                self.depth += 1;
                let inner = self.parse_or();
                self.depth -= 1;
                if self.peek() == Some(&Token::RParen) {
                    self.advance();
                }
                inner
            }
            _ => None,
        }
    }
}

fn combine(mut nodes: Vec<QueryNode>, wrap: fn(Vec<QueryNode>) -> QueryNode) -> Option<QueryNode> {
    match nodes.len() {
        0 => None,
        1 => nodes.pop(),
        _ => Some(wrap(nodes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(t: &str) -> QueryNode {
        QueryNode::Term(t.to_string())
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let query = SearchQuery::parse("   ");
        assert!(query.is_empty());
        assert!(query.matches("anything"));
    }

    #[test]
    fn test_adjacent_terms_are_anded() {
        let query = SearchQuery::parse("rust backend");
        assert_eq!(query.root, Some(QueryNode::And(vec![term("rust"), term("backend")])));
        assert!(query.matches("Senior Rust Backend Engineer"));
        assert!(!query.matches("Senior Rust Engineer"));
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let query = SearchQuery::parse("rust AND tokio OR golang");
        assert_eq!(
            query.root,
            Some(QueryNode::Or(vec![
                QueryNode::And(vec![term("rust"), term("tokio")]),
                term("golang"),
            ]))
        );
        assert!(query.matches("golang developer"));
        assert!(query.matches("rust + tokio"));
        assert!(!query.matches("rust only"));
    }

    #[test]
    fn test_not_and_dash_negate() {
        let not_query = SearchQuery::parse("engineer NOT manager");
        let dash_query = SearchQuery::parse("engineer -manager");
        assert_eq!(not_query, dash_query);
        assert!(not_query.matches("Software Engineer"));
        assert!(!not_query.matches("Engineering Manager"));
    }

    #[test]
    fn test_quoted_phrase_is_single_term() {
        let query = SearchQuery::parse(r#""machine   learning" python"#);
        assert_eq!(
            query.root,
            Some(QueryNode::And(vec![term("machine learning"), term("python")]))
        );
        assert!(query.matches("Python for Machine Learning"));
        assert!(!query.matches("machine vision and learning in python"));
    }

    #[test]
    fn test_parentheses_group() {
        let query = SearchQuery::parse("(react OR vue) AND typescript");
        assert!(query.matches("Vue + TypeScript"));
        assert!(!query.matches("React + JavaScript"));
    }

    #[test]
    fn test_lowercase_operators_are_terms() {
        let query = SearchQuery::parse("research and development");
        assert_eq!(
            query.root,
            Some(QueryNode::And(vec![
                term("research"),
                term("and"),
                term("development")
            ]))
        );
    }

    #[test]
    fn test_dangling_operators_are_dropped() {
        assert_eq!(SearchQuery::parse("rust AND").root, Some(term("rust")));
        assert_eq!(SearchQuery::parse("OR rust").root, Some(term("rust")));
        assert_eq!(SearchQuery::parse("rust NOT").root, Some(term("rust")));
        assert_eq!(SearchQuery::parse("rust -").root, Some(term("rust")));
    }

    #[test]
    fn test_unbalanced_parentheses_tolerated() {
        let open = SearchQuery::parse("(rust OR go");
        assert!(open.matches("go developer"));

        let stray = SearchQuery::parse("rust) backend");
        assert_eq!(stray.root, Some(QueryNode::And(vec![term("rust"), term("backend")])));
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let query = SearchQuery::parse(r#""site reliability"#);
        assert_eq!(query.root, Some(term("site reliability")));
    }

    #[test]
    fn test_matches_any_field_joins_fields() {
        let query = SearchQuery::parse("acme rust");
        assert!(query.matches_any_field(["Backend Engineer", "Acme Corp", "Rust, SQL"]));
        assert!(!query.matches_any_field(["Backend Engineer", "Rust, SQL"]));
    }

    /// Runs `f` on a thread with the 2 MiB stack tokio gives its workers.
    fn on_worker_sized_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_deeply_nested_groups_do_not_overflow() {
        let query = on_worker_sized_stack(|| SearchQuery::parse(&("(".repeat(100_000) + "rust")));
        assert_eq!(query.root, Some(term("rust")));

        let closed = on_worker_sized_stack(|| {
            SearchQuery::parse(&format!("{}rust{}", "(".repeat(100_000), ")".repeat(100_000)))
        });
        assert!(closed.matches("rust developer"));
    }

    #[test]
    fn test_long_negation_runs_collapse() {
        let dashes = on_worker_sized_stack(|| SearchQuery::parse(&"-".repeat(100_000)));
        assert!(dashes.is_empty());

        // 99_999 dashes before the term: odd, so negated
        let odd = on_worker_sized_stack(|| SearchQuery::parse(&("-".repeat(99_999) + "rust")));
        assert_eq!(odd.root, Some(QueryNode::Not(Box::new(term("rust")))));

        let words = on_worker_sized_stack(|| SearchQuery::parse(&"NOT ".repeat(100_000)));
        assert!(words.is_empty());
    }

    #[test]
    fn test_double_negation_cancels() {
        assert_eq!(SearchQuery::parse("NOT NOT rust").root, Some(term("rust")));
        assert_eq!(SearchQuery::parse("--rust").root, Some(term("rust")));
    }

    #[test]
    fn test_groups_within_depth_limit_are_kept() {
        let query = SearchQuery::parse("((rust OR go) AND backend)");
        assert!(query.matches("Go backend engineer"));
        assert!(!query.matches("Go frontend engineer"));
    }
}
