//! The SQL-file parser.
//!
//! Consumes a tokenized definition file and produces a [`Schema`] plus
//! diagnostics. Parsing never fails outright: on an unrecognized token the
//! parser records a diagnostic and resynchronizes to the next top-level
//! `;`, so later statements still parse.

use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::{tokenize, Keyword, Span, Token, TokenKind};
use crate::schema::{
    validate, ColumnReference, ColumnSpec, DynamicClauseKind, ForeignKey, ForeignKeyAction,
    NamedQuery, Placeholder, QueryFragment, Schema, TableSpec,
};
use crate::types::SqlType;

/// What one parse run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// The (possibly partial) schema.
    pub schema: Schema,
    /// Everything that went wrong, in source order where locatable.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// True if any diagnostic is fatal for code generation.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

/// Parses a definition file: `CREATE TABLE` statements and named queries.
#[must_use]
pub fn parse_schema(source: &str) -> ParseResult {
    let (tokens, lex_errors) = tokenize(source);
    let mut parser = SchemaParser {
        source,
        tokens,
        pos: 0,
        diagnostics: lex_errors.into_iter().map(Diagnostic::from).collect(),
        schema: Schema::default(),
    };
    parser.parse_file();

    let SchemaParser {
        schema,
        mut diagnostics,
        ..
    } = parser;
    diagnostics.extend(validate(&schema));
    debug!(
        tables = schema.tables.len(),
        queries = schema.queries.len(),
        diagnostics = diagnostics.len(),
        "parsed schema file"
    );
    ParseResult {
        schema,
        diagnostics,
    }
}

/// Marker for "record a diagnostic, then resynchronize the statement".
struct Recovery;

type Fallible<T> = Result<T, Recovery>;

/// State machine for placeholder classification inside a named query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryState {
    Default,
    /// The previous token was the `IN` keyword.
    AfterIn,
    /// The previous token was `ORDER`; waiting for `BY`.
    SeenOrder,
    /// Inside an `ORDER BY` tail.
    InOrderBy,
}

struct SchemaParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    schema: Schema,
}

impl SchemaParser<'_> {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, n: usize) -> &TokenKind {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn at_end(&self) -> bool {
        self.current().is_eof()
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        self.current().is_keyword(kw)
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&mut self, kind: DiagnosticKind) {
        let span = self.current().span;
        self.diagnostics.push(Diagnostic::error(kind, Some(span)));
    }

    fn unexpected(&mut self, expected: &str) -> Recovery {
        self.error_here(DiagnosticKind::UnexpectedToken {
            expected: String::from(expected),
            found: self.kind().describe(),
        });
        Recovery
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Fallible<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("keyword {}", kw.as_str())))
        }
    }

    fn expect_token(
        &mut self,
        expected: &str,
        pred: impl Fn(&TokenKind) -> bool,
    ) -> Fallible<Token> {
        if pred(self.kind()) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self) -> Fallible<String> {
        if let TokenKind::Identifier(name) = self.kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    /// Skips forward past the next top-level `;`.
    fn recover(&mut self) {
        while !self.at_end() {
            if matches!(self.kind(), TokenKind::Semicolon) {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn parse_file(&mut self) {
        while !self.at_end() {
            if matches!(self.kind(), TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if self.check_keyword(Keyword::Create) {
                match self.parse_create_table() {
                    Ok(table) => {
                        trace!(table = %table.name, "parsed table");
                        self.schema.tables.push(table);
                    }
                    Err(Recovery) => self.recover(),
                }
                continue;
            }
            if matches!(self.kind(), TokenKind::Identifier(_))
                && matches!(self.peek_kind(1), TokenKind::Colon)
            {
                match self.parse_named_query() {
                    Ok(query) => {
                        trace!(query = %query.label, "parsed named query");
                        self.schema.queries.push(query);
                    }
                    Err(Recovery) => self.recover(),
                }
                continue;
            }
            let _ = self.unexpected("CREATE TABLE or a query label");
            self.recover();
        }
    }

    // --- CREATE TABLE -----------------------------------------------------

    fn parse_create_table(&mut self) -> Fallible<TableSpec> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;
        let name = self.expect_identifier()?;
        let mut table = TableSpec::new(name);

        self.expect_token("`(`", |k| matches!(k, TokenKind::LeftParen))?;
        loop {
            match self.kind() {
                TokenKind::Keyword(Keyword::Primary | Keyword::Unique | Keyword::Foreign) => {
                    self.parse_table_constraint(&mut table)?;
                }
                _ => {
                    let column = self.parse_column_def()?;
                    table.columns.push(column);
                }
            }
            if matches!(self.kind(), TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_token("`)`", |k| matches!(k, TokenKind::RightParen))?;

        if self.eat_keyword(Keyword::Without) {
            self.expect_keyword(Keyword::Rowid)?;
            table.without_rowid = true;
        }
        if self.eat_keyword(Keyword::As) {
            table.mapped_class_name = Some(self.expect_mapped_name()?);
        }
        self.expect_token("`;`", |k| matches!(k, TokenKind::Semicolon))?;
        Ok(table)
    }

    fn expect_mapped_name(&mut self) -> Fallible<String> {
        match self.kind() {
            TokenKind::Identifier(_) => self.expect_identifier(),
            TokenKind::StringLiteral { value, .. } => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected("a mapped class name")),
        }
    }

    fn parse_column_def(&mut self) -> Fallible<ColumnSpec> {
        let name = self.expect_identifier()?;
        let declared = self.parse_declared_type()?;
        let mut column = ColumnSpec::new(name, declared);

        loop {
            match self.kind() {
                TokenKind::Keyword(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    let _ = self.eat_keyword(Keyword::Asc) || self.eat_keyword(Keyword::Desc);
                    column.primary_key = true;
                    column.nullable = false;
                    if self.eat_keyword(Keyword::Autoincrement) {
                        column.autoincrement = true;
                    }
                }
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    column.nullable = false;
                }
                TokenKind::Keyword(Keyword::Unique) => {
                    self.advance();
                    column.unique = true;
                }
                TokenKind::Keyword(Keyword::Default) => {
                    self.advance();
                    column.default = Some(self.parse_default_expr()?);
                }
                TokenKind::Keyword(Keyword::References) => {
                    self.advance();
                    column.references = Some(self.parse_reference()?);
                }
                TokenKind::Comma | TokenKind::RightParen => break,
                _ => return Err(self.unexpected("a column constraint, `,` or `)`")),
            }
        }
        Ok(column)
    }

    /// The declared type is optional and preserved textually, including a
    /// parenthesized size or precision.
    fn parse_declared_type(&mut self) -> Fallible<String> {
        let base = match self.kind() {
            TokenKind::Keyword(kw) if kw.is_type_name() => self.advance().text,
            TokenKind::Identifier(_) => self.advance().text,
            _ => return Ok(String::new()),
        };

        if matches!(self.kind(), TokenKind::LeftParen) {
            let open = self.advance();
            let mut depth = 1_usize;
            let end;
            loop {
                if self.at_end() {
                    return Err(self.unexpected("`)`"));
                }
                let token = self.advance();
                match token.kind {
                    TokenKind::LeftParen => depth += 1,
                    TokenKind::RightParen => {
                        depth -= 1;
                        if depth == 0 {
                            end = token.span.end;
                            break;
                        }
                    }
                    _ => {}
                }
            }
            return Ok(format!("{base}{}", &self.source[open.span.start..end]));
        }
        Ok(base)
    }

    /// A `DEFAULT` value: a literal (optionally signed), an identifier such
    /// as `CURRENT_TIMESTAMP`, or a balanced parenthesized expression. The
    /// text is preserved verbatim.
    fn parse_default_expr(&mut self) -> Fallible<String> {
        match self.kind() {
            TokenKind::LeftParen => {
                let open = self.advance();
                let mut depth = 1_usize;
                loop {
                    if self.at_end() {
                        return Err(self.unexpected("`)`"));
                    }
                    let token = self.advance();
                    match token.kind {
                        TokenKind::LeftParen => depth += 1,
                        TokenKind::RightParen => {
                            depth -= 1;
                            if depth == 0 {
                                return Ok(String::from(
                                    &self.source[open.span.start..token.span.end],
                                ));
                            }
                        }
                        _ => {}
                    }
                }
            }
            TokenKind::Minus | TokenKind::Plus => {
                let sign = self.advance();
                let number =
                    self.expect_token("a number", |k| matches!(k, TokenKind::Number(_)))?;
                Ok(String::from(
                    &self.source[sign.span.start..number.span.end],
                ))
            }
            TokenKind::Number(_)
            | TokenKind::StringLiteral { .. }
            | TokenKind::Identifier(_)
            | TokenKind::Keyword(Keyword::Null | Keyword::True | Keyword::False) => {
                Ok(self.advance().text)
            }
            _ => Err(self.unexpected("a default value")),
        }
    }

    /// The part after `REFERENCES`: target table, optional column list,
    /// optional `ON DELETE` / `ON UPDATE` actions.
    fn parse_reference(&mut self) -> Fallible<ColumnReference> {
        let table = self.expect_identifier()?;
        let mut reference = ColumnReference::to_table(table);

        if matches!(self.kind(), TokenKind::LeftParen) {
            self.advance();
            reference.columns = self.parse_identifier_list()?;
            self.expect_token("`)`", |k| matches!(k, TokenKind::RightParen))?;
        }

        while self.eat_keyword(Keyword::On) {
            let is_delete = if self.eat_keyword(Keyword::Delete) {
                true
            } else if self.eat_keyword(Keyword::Update) {
                false
            } else {
                return Err(self.unexpected("DELETE or UPDATE"));
            };
            let action = self.parse_fk_action()?;
            if is_delete {
                reference.on_delete = action;
            } else {
                reference.on_update = action;
            }
        }
        Ok(reference)
    }

    fn parse_fk_action(&mut self) -> Fallible<ForeignKeyAction> {
        if self.eat_keyword(Keyword::Cascade) {
            Ok(ForeignKeyAction::Cascade)
        } else if self.eat_keyword(Keyword::Restrict) {
            Ok(ForeignKeyAction::Restrict)
        } else if self.eat_keyword(Keyword::Set) {
            if self.eat_keyword(Keyword::Null) {
                Ok(ForeignKeyAction::SetNull)
            } else if self.eat_keyword(Keyword::Default) {
                Ok(ForeignKeyAction::SetDefault)
            } else {
                Err(self.unexpected("NULL or DEFAULT"))
            }
        } else if self.eat_keyword(Keyword::No) {
            self.expect_keyword(Keyword::Action)?;
            Ok(ForeignKeyAction::NoAction)
        } else {
            Err(self.unexpected("a foreign-key action"))
        }
    }

    fn parse_identifier_list(&mut self) -> Fallible<Vec<String>> {
        let mut names = vec![self.expect_identifier()?];
        while matches!(self.kind(), TokenKind::Comma) {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    fn parse_table_constraint(&mut self, table: &mut TableSpec) -> Fallible<()> {
        match self.kind() {
            TokenKind::Keyword(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                self.expect_token("`(`", |k| matches!(k, TokenKind::LeftParen))?;
                table.primary_key = self.parse_identifier_list()?;
                self.expect_token("`)`", |k| matches!(k, TokenKind::RightParen))?;
            }
            TokenKind::Keyword(Keyword::Unique) => {
                self.advance();
                self.expect_token("`(`", |k| matches!(k, TokenKind::LeftParen))?;
                let columns = self.parse_identifier_list()?;
                self.expect_token("`)`", |k| matches!(k, TokenKind::RightParen))?;
                table.unique_constraints.push(columns);
            }
            TokenKind::Keyword(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                self.expect_token("`(`", |k| matches!(k, TokenKind::LeftParen))?;
                let columns = self.parse_identifier_list()?;
                self.expect_token("`)`", |k| matches!(k, TokenKind::RightParen))?;
                self.expect_keyword(Keyword::References)?;
                let reference = self.parse_reference()?;
                table.foreign_keys.push(ForeignKey { columns, reference });
            }
            _ => return Err(self.unexpected("a table constraint")),
        }
        Ok(())
    }

    // --- Named queries ----------------------------------------------------

    /// A `label: sql…;` statement. The body is forwarded verbatim, split
    /// only at the placeholders the state machine classifies.
    fn parse_named_query(&mut self) -> Fallible<NamedQuery> {
        let label = self.expect_identifier()?;
        self.expect_token("`:`", |k| matches!(k, TokenKind::Colon))?;

        let mut fragments = Vec::new();
        let mut run_start = self.current().span.start;
        let mut state = QueryState::Default;
        // The two tokens preceding the one being classified.
        let mut prev: [Option<TokenKind>; 2] = [None, None];

        loop {
            match self.kind().clone() {
                TokenKind::Eof => {
                    let _ = self.unexpected("`;`");
                    let end = self.current().span.start;
                    flush_literal(&mut fragments, self.source, run_start, end);
                    return Ok(NamedQuery { label, fragments });
                }
                TokenKind::Semicolon => {
                    let end = self.current().span.start;
                    self.advance();
                    flush_literal(&mut fragments, self.source, run_start, end);
                    return Ok(NamedQuery { label, fragments });
                }
                TokenKind::NamedParam(name) => {
                    let token = self.advance();
                    if let Some(placeholder) = self.classify_named(&name, state, &prev, token.span)
                    {
                        flush_literal(&mut fragments, self.source, run_start, token.span.start);
                        fragments.push(QueryFragment::Placeholder(placeholder));
                        run_start = token.span.end;
                    }
                    state = next_state(&token.kind, state);
                    push_prev(&mut prev, token.kind);
                }
                TokenKind::PositionalParam(index) => {
                    let token = self.advance();
                    let placeholder = if state == QueryState::AfterIn {
                        Placeholder::InList { name: None }
                    } else {
                        Placeholder::Positional { index }
                    };
                    flush_literal(&mut fragments, self.source, run_start, token.span.start);
                    fragments.push(QueryFragment::Placeholder(placeholder));
                    run_start = token.span.end;
                    state = next_state(&token.kind, state);
                    push_prev(&mut prev, token.kind);
                }
                _ => {
                    let token = self.advance();
                    state = next_state(&token.kind, state);
                    push_prev(&mut prev, token.kind);
                }
            }
        }
    }

    /// Decides what a `$name` occurrence means. Returns `None` when the
    /// placeholder has no interpretation; the diagnostic is recorded and
    /// the source text flows on as literal SQL.
    fn classify_named(
        &mut self,
        name: &str,
        state: QueryState,
        prev: &[Option<TokenKind>; 2],
        span: Span,
    ) -> Option<Placeholder> {
        if state == QueryState::AfterIn {
            return Some(Placeholder::InList {
                name: Some(String::from(name)),
            });
        }
        if state == QueryState::InOrderBy {
            return Some(Placeholder::DynamicClause {
                name: String::from(name),
                kind: DynamicClauseKind::OrderBy,
            });
        }

        // Table position: no interpretation.
        if matches!(
            prev[1],
            Some(TokenKind::Keyword(Keyword::From | Keyword::Into | Keyword::Join))
        ) {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticKind::InvalidPlaceholder(String::from(name)),
                Some(span),
            ));
            return None;
        }

        // A placeholder standing alone after WHERE/AND/OR is a predicate.
        let after_connective = matches!(
            prev[1],
            Some(TokenKind::Keyword(Keyword::Where | Keyword::And | Keyword::Or))
        );
        if after_connective && !continues_expression(self.kind()) {
            return Some(Placeholder::DynamicClause {
                name: String::from(name),
                kind: DynamicClauseKind::Predicate,
            });
        }

        Some(Placeholder::Value {
            name: String::from(name),
            expected_type: self.infer_value_type(prev),
        })
    }

    /// Infers the slot type of a value placeholder from a directly
    /// preceding `<column> <comparison-op>` pair, when the column name
    /// resolves uniquely against the tables parsed so far.
    fn infer_value_type(&self, prev: &[Option<TokenKind>; 2]) -> Option<SqlType> {
        let is_comparison = matches!(
            prev[1],
            Some(
                TokenKind::Eq
                    | TokenKind::NotEq
                    | TokenKind::Lt
                    | TokenKind::LtEq
                    | TokenKind::Gt
                    | TokenKind::GtEq
            )
        );
        if !is_comparison {
            return None;
        }
        let Some(TokenKind::Identifier(column)) = &prev[0] else {
            return None;
        };

        let mut found = None;
        for table in &self.schema.tables {
            if let Some(spec) = table.column(column) {
                if found.is_some() {
                    // Ambiguous across tables.
                    return None;
                }
                found = Some(spec.sql_type);
            }
        }
        found
    }
}

/// True if the token after a `$name` means the placeholder participates in
/// a larger expression rather than standing alone.
fn continues_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Keyword(Keyword::Is | Keyword::In | Keyword::Like | Keyword::Between)
    )
}

fn next_state(kind: &TokenKind, state: QueryState) -> QueryState {
    match kind {
        TokenKind::Keyword(Keyword::In) => QueryState::AfterIn,
        TokenKind::Keyword(Keyword::Order) => QueryState::SeenOrder,
        TokenKind::Keyword(Keyword::By) if state == QueryState::SeenOrder => QueryState::InOrderBy,
        TokenKind::Keyword(
            Keyword::Where
            | Keyword::Group
            | Keyword::Having
            | Keyword::Limit
            | Keyword::Offset
            | Keyword::Union,
        ) => QueryState::Default,
        _ => match state {
            QueryState::AfterIn | QueryState::SeenOrder => QueryState::Default,
            other => other,
        },
    }
}

fn push_prev(prev: &mut [Option<TokenKind>; 2], kind: TokenKind) {
    prev[0] = prev[1].take();
    prev[1] = Some(kind);
}

fn flush_literal(fragments: &mut Vec<QueryFragment>, source: &str, start: usize, end: usize) {
    if end > start {
        fragments.push(QueryFragment::LiteralSql(String::from(&source[start..end])));
    }
}
