//! Smart collection rules.
//!
//! Lightroom keeps no membership rows for a smart collection. Its rules are
//! stored as a serialized Lua table in `AgLibraryCollectionContent` under
//! the `ag.library.smart_collection` module, for example:
//!
//! ```text
//! s = {
//!     {
//!         criteria = "rating",
//!         operation = ">=",
//!         value = 5,
//!         value2 = 0,
//!     },
//!     combine = "intersect",
//! }
//! ```
//!
//! This module parses that table into a [`RuleGroup`] and translates it into
//! a SQL condition over `Adobe_images` (alias `i`) and `AgLibraryFile`
//! (alias `f`). Criteria with no SQL translation are reported as
//! [`LibraryError::Unsupported`].

use crate::error::{LibraryError, Result};
use chrono::NaiveDate;

/// `owningModule` of the content row holding the rules
pub const SMART_COLLECTION_MODULE: &str = "ag.library.smart_collection";

const LABEL_TEXT: &str = "i.colorLabels";
const FILE_NAME: &str =
    "f.baseName || CASE WHEN COALESCE(f.extension, '') = '' THEN '' ELSE '.' || f.extension END";
const FOLDER_PATH: &str = "COALESCE(rf.absolutePath, '') || COALESCE(fo.pathFromRoot, '')";
const CAPTURE_DATE: &str = "substr(i.captureTime, 1, 10)";
const STANDARD_LABELS: [&str; 5] = ["red", "yellow", "green", "blue", "purple"];

// ============================================================================
// Lua table parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Table(LuaTable),
}

impl LuaValue {
    fn as_text(&self) -> Option<String> {
        match self {
            LuaValue::Str(s) => Some(s.clone()),
            LuaValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            LuaValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            LuaValue::Number(n) => Some(*n),
            LuaValue::Str(s) => s.trim().parse().ok(),
            LuaValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// Table constructor contents: positional items and keyed fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LuaTable {
    pub items: Vec<LuaValue>,
    pub fields: Vec<(String, LuaValue)>,
}

impl LuaTable {
    pub fn get(&self, key: &str) -> Option<&LuaValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(LuaValue::as_text)
    }
}

/// Parse a rule blob: a table constructor, optionally preceded by
/// `name =` or `return`.
pub fn parse_lua_table(source: &str) -> Result<LuaTable> {
    let mut parser = LuaParser {
        chars: source.chars().collect(),
        pos: 0,
    };

    parser.skip_trivia();
    let start = parser.pos;
    if let Some(word) = parser.identifier() {
        parser.skip_trivia();
        if word != "return" && !parser.eat('=') {
            parser.pos = start;
        }
    }

    parser.skip_trivia();
    let table = match parser.value()? {
        LuaValue::Table(table) => table,
        _ => return Err(parser.error("expected a table")),
    };
    parser.skip_trivia();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("trailing content"));
    }
    Ok(table)
}

struct LuaParser {
    chars: Vec<char>,
    pos: usize,
}

impl LuaParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_trivia();
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn error(&self, message: &str) -> LibraryError {
        LibraryError::InvalidCatalog(format!(
            "smart collection rules: {} at offset {}",
            message, self.pos
        ))
    }

    fn skip_trivia(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }
            if self.peek() == Some('-') && self.peek_at(1) == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn identifier(&mut self) -> Option<String> {
        let first = self.peek()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    fn value(&mut self) -> Result<LuaValue> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => self.table().map(LuaValue::Table),
            Some('"') | Some('\'') => self.quoted().map(LuaValue::Str),
            Some('[') if self.peek_at(1) == Some('[') => self.long_string().map(LuaValue::Str),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '.' => self.number(),
            Some(_) => match self.identifier().as_deref() {
                Some("true") => Ok(LuaValue::Bool(true)),
                Some("false") => Ok(LuaValue::Bool(false)),
                Some("nil") => Ok(LuaValue::Nil),
                _ => Err(self.error("unexpected token")),
            },
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn table(&mut self) -> Result<LuaTable> {
        self.expect('{')?;
        let mut table = LuaTable::default();

        loop {
            self.skip_trivia();
            if self.eat('}') {
                return Ok(table);
            }

            if self.peek() == Some('[') && self.peek_at(1) != Some('[') {
                self.pos += 1;
                let key = self.value()?;
                self.expect(']')?;
                self.expect('=')?;
                let value = self.value()?;
                let key = key
                    .as_text()
                    .ok_or_else(|| self.error("unsupported table key"))?;
                table.fields.push((key, value));
            } else {
                let start = self.pos;
                let keyed = match self.identifier() {
                    Some(name) if !matches!(name.as_str(), "true" | "false" | "nil") => {
                        self.skip_trivia();
                        if self.peek() == Some('=') && self.peek_at(1) != Some('=') {
                            self.pos += 1;
                            Some(name)
                        } else {
                            None
                        }
                    }
                    _ => None,
                };
                match keyed {
                    Some(name) => {
                        let value = self.value()?;
                        table.fields.push((name, value));
                    }
                    None => {
                        self.pos = start;
                        let value = self.value()?;
                        table.items.push(value);
                    }
                }
            }

            self.skip_trivia();
            if !(self.eat(',') || self.eat(';')) {
                self.expect('}')?;
                return Ok(table);
            }
        }
    }

    fn quoted(&mut self) -> Result<String> {
        let quote = self.peek().ok_or_else(|| self.error("expected string"))?;
        self.pos += 1;
        let mut out = String::new();

        loop {
            let c = self
                .peek()
                .ok_or_else(|| self.error("unterminated string"))?;
            self.pos += 1;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escaped = self
                .peek()
                .ok_or_else(|| self.error("unterminated escape"))?;
            self.pos += 1;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '\n' => out.push('\n'),
                d if d.is_ascii_digit() => {
                    let mut code = d.to_digit(10).unwrap_or_default();
                    for _ in 0..2 {
                        match self.peek().and_then(|c| c.to_digit(10)) {
                            Some(digit) => {
                                code = code * 10 + digit;
                                self.pos += 1;
                            }
                            None => break,
                        }
                    }
                    out.push(char::from_u32(code).ok_or_else(|| self.error("bad escape"))?);
                }
                other => out.push(other),
            }
        }
    }

    fn long_string(&mut self) -> Result<String> {
        self.pos += 2;
        let start = self.pos;
        while self.pos + 1 < self.chars.len() {
            if self.chars[self.pos] == ']' && self.chars[self.pos + 1] == ']' {
                let text = self.chars[start..self.pos].iter().collect();
                self.pos += 2;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated long string"))
    }

    fn number(&mut self) -> Result<LuaValue> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(LuaValue::Number)
            .map_err(|_| self.error("invalid number"))
    }
}

// ============================================================================
// Rule model
// ============================================================================

/// How the rules of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// "Match all" (`intersect`)
    All,
    /// "Match any" (`union`)
    Any,
    /// "Match none" (`exclude`)
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub criteria: String,
    pub operation: String,
    pub value: LuaValue,
    pub value2: LuaValue,
    pub units: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Criterion(Criterion),
    Group(RuleGroup),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleGroup {
    pub combine: Combine,
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    /// Parse a stored rule blob.
    pub fn parse(source: &str) -> Result<Self> {
        Self::from_table(&parse_lua_table(source)?)
    }

    pub fn from_table(table: &LuaTable) -> Result<Self> {
        let combine = match table.get_text("combine").as_deref() {
            None | Some("intersect") => Combine::All,
            Some("union") => Combine::Any,
            Some("exclude") => Combine::None,
            Some(other) => {
                return Err(LibraryError::Unsupported(format!(
                    "smart collection combine mode '{}'",
                    other
                )))
            }
        };

        let mut rules = Vec::with_capacity(table.items.len());
        for item in &table.items {
            let LuaValue::Table(entry) = item else {
                return Err(LibraryError::InvalidCatalog(
                    "smart collection rule is not a table".to_string(),
                ));
            };

            if let Some(criteria) = entry.get_text("criteria") {
                rules.push(Rule::Criterion(Criterion {
                    criteria,
                    operation: entry.get_text("operation").unwrap_or_default(),
                    value: entry.get("value").cloned().unwrap_or(LuaValue::Nil),
                    value2: entry.get("value2").cloned().unwrap_or(LuaValue::Nil),
                    units: entry.get_text("_units").or_else(|| entry.get_text("units")),
                }));
            } else {
                rules.push(Rule::Group(RuleGroup::from_table(entry)?));
            }
        }

        Ok(Self { combine, rules })
    }

    /// Translate to a SQL condition.
    pub fn to_filter(&self) -> Result<SmartFilter> {
        let mut translator = Translator::default();
        let sql = translator.group(self)?;
        Ok(SmartFilter {
            sql,
            binds: translator.binds,
            needs_folder: translator.needs_folder,
        })
    }
}

// ============================================================================
// SQL translation
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    F64(f64),
}

/// Condition over `Adobe_images i` and `AgLibraryFile f`, binds in
/// placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartFilter {
    pub sql: String,
    pub binds: Vec<BindValue>,
    /// Condition references `fo` (`AgLibraryFolder`) and `rf`
    /// (`AgLibraryRootFolder`)
    pub needs_folder: bool,
}

enum TextTarget {
    Column(&'static str),
    Keywords,
}

#[derive(Default)]
struct Translator {
    binds: Vec<BindValue>,
    needs_folder: bool,
}

fn unsupported(criterion: &Criterion) -> LibraryError {
    LibraryError::Unsupported(format!(
        "smart collection criterion '{}' with operation '{}'",
        criterion.criteria, criterion.operation
    ))
}

fn like_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Translator {
    fn group(&mut self, group: &RuleGroup) -> Result<String> {
        let mut parts = Vec::with_capacity(group.rules.len());
        for rule in &group.rules {
            let part = match rule {
                Rule::Criterion(criterion) => self.criterion(criterion)?,
                Rule::Group(nested) => self.group(nested)?,
            };
            parts.push(format!("({})", part));
        }

        Ok(match (group.combine, parts.is_empty()) {
            (Combine::All, true) | (Combine::None, true) => "1".to_string(),
            (Combine::Any, true) => "0".to_string(),
            (Combine::All, false) => parts.join(" AND "),
            (Combine::Any, false) => parts.join(" OR "),
            (Combine::None, false) => format!("NOT ({})", parts.join(" OR ")),
        })
    }

    fn criterion(&mut self, c: &Criterion) -> Result<String> {
        match c.criteria.as_str() {
            "rating" => self.numeric("COALESCE(i.rating, 0)", c),
            "pick" => self.numeric("COALESCE(i.pick, 0)", c),
            "labelColor" => self.label_color(c),
            "labelText" => self.text(TextTarget::Column(LABEL_TEXT), c),
            "keywords" => self.text(TextTarget::Keywords, c),
            "filename" => self.text(TextTarget::Column(FILE_NAME), c),
            "folder" => {
                self.needs_folder = true;
                self.text(TextTarget::Column(FOLDER_PATH), c)
            }
            "fileFormat" => self.file_format(c),
            "captureTime" => self.capture_time(c),
            _ => Err(unsupported(c)),
        }
    }

    fn numeric(&mut self, expr: &str, c: &Criterion) -> Result<String> {
        let value = c.value.as_number().ok_or_else(|| unsupported(c))?;
        let comparator = match c.operation.as_str() {
            "==" => "=",
            "!=" => "<>",
            ">" => ">",
            ">=" => ">=",
            "<" => "<",
            "<=" => "<=",
            "in" => {
                let other = c.value2.as_number().ok_or_else(|| unsupported(c))?;
                self.binds.push(BindValue::F64(value.min(other)));
                self.binds.push(BindValue::F64(value.max(other)));
                return Ok(format!("{} BETWEEN ? AND ?", expr));
            }
            _ => return Err(unsupported(c)),
        };
        self.binds.push(BindValue::F64(value));
        Ok(format!("{} {} ?", expr, comparator))
    }

    fn label_color(&mut self, c: &Criterion) -> Result<String> {
        let color = c
            .value
            .as_text()
            .ok_or_else(|| unsupported(c))?
            .to_lowercase();
        let label = "LOWER(COALESCE(i.colorLabels, ''))";

        let condition = match color.as_str() {
            "none" => format!("{} = ''", label),
            "custom" => format!(
                "{} NOT IN ('', {})",
                label,
                STANDARD_LABELS
                    .iter()
                    .map(|l| format!("'{}'", l))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            _ => {
                self.binds.push(BindValue::Text(color));
                format!("{} = ?", label)
            }
        };

        match c.operation.as_str() {
            "==" => Ok(condition),
            "!=" => Ok(format!("NOT ({})", condition)),
            _ => Err(unsupported(c)),
        }
    }

    fn file_format(&mut self, c: &Criterion) -> Result<String> {
        let format = c.value.as_text().ok_or_else(|| unsupported(c))?.to_uppercase();
        let comparator = match c.operation.as_str() {
            "==" => "=",
            "!=" => "<>",
            _ => return Err(unsupported(c)),
        };
        self.binds.push(BindValue::Text(format));
        Ok(format!("UPPER(COALESCE(i.fileFormat, '')) {} ?", comparator))
    }

    fn text_match(&mut self, target: &TextTarget, pattern: String) -> String {
        self.binds.push(BindValue::Text(pattern));
        match target {
            TextTarget::Column(expr) => {
                format!("LOWER(COALESCE({}, '')) LIKE ? ESCAPE '\\'", expr)
            }
            TextTarget::Keywords => "EXISTS (SELECT 1 FROM AgLibraryKeywordImage ki \
                 JOIN AgLibraryKeyword k ON k.id_local = ki.tag \
                 WHERE ki.image = i.id_local AND LOWER(k.name) LIKE ? ESCAPE '\\')"
                .to_string(),
        }
    }

    fn is_empty(target: &TextTarget) -> String {
        match target {
            TextTarget::Column(expr) => format!("COALESCE({}, '') = ''", expr),
            TextTarget::Keywords => "NOT EXISTS (SELECT 1 FROM AgLibraryKeywordImage ki \
                 WHERE ki.image = i.id_local)"
                .to_string(),
        }
    }

    fn text(&mut self, target: TextTarget, c: &Criterion) -> Result<String> {
        match c.operation.as_str() {
            "empty" => return Ok(Self::is_empty(&target)),
            "notEmpty" => return Ok(format!("NOT ({})", Self::is_empty(&target))),
            _ => {}
        }

        let value = c.value.as_text().ok_or_else(|| unsupported(c))?.to_lowercase();
        let words: Vec<String> = value.split_whitespace().map(like_escape).collect();

        match c.operation.as_str() {
            "any" | "all" | "words" | "noneOf" => {
                if words.is_empty() {
                    return Ok("1".to_string());
                }
                let parts: Vec<String> = words
                    .iter()
                    .map(|word| self.text_match(&target, format!("%{}%", word)))
                    .collect();
                Ok(match c.operation.as_str() {
                    "any" => parts.join(" OR "),
                    "noneOf" => format!("NOT ({})", parts.join(" OR ")),
                    _ => parts.join(" AND "),
                })
            }
            "beginsWith" => Ok(self.text_match(&target, format!("{}%", like_escape(&value)))),
            "endsWith" => Ok(self.text_match(&target, format!("%{}", like_escape(&value)))),
            "==" => Ok(self.text_match(&target, like_escape(&value))),
            "!=" => Ok(format!("NOT ({})", self.text_match(&target, like_escape(&value)))),
            _ => Err(unsupported(c)),
        }
    }

    fn date_bind(&mut self, value: &LuaValue, c: &Criterion) -> Result<()> {
        let text = value.as_text().ok_or_else(|| unsupported(c))?;
        let day = text.get(..10).unwrap_or(&text);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| unsupported(c))?;
        self.binds
            .push(BindValue::Text(date.format("%Y-%m-%d").to_string()));
        Ok(())
    }

    fn capture_time(&mut self, c: &Criterion) -> Result<String> {
        let comparator = match c.operation.as_str() {
            "==" => "=",
            "!=" => "<>",
            ">" => ">",
            ">=" => ">=",
            "<" => "<",
            "<=" => "<=",
            "in" => {
                let mut bounds = [c.value.clone(), c.value2.clone()];
                if bounds[0].as_text() > bounds[1].as_text() {
                    bounds.swap(0, 1);
                }
                self.date_bind(&bounds[0], c)?;
                self.date_bind(&bounds[1], c)?;
                return Ok(format!("{} BETWEEN ? AND ?", CAPTURE_DATE));
            }
            "inLast" | "notInLast" => {
                let count = c.value.as_number().ok_or_else(|| unsupported(c))? as i64;
                let modifier = match c.units.as_deref().unwrap_or("days") {
                    "days" => format!("-{} days", count),
                    "weeks" => format!("-{} days", count * 7),
                    "months" => format!("-{} months", count),
                    "years" => format!("-{} years", count),
                    _ => return Err(unsupported(c)),
                };
                self.binds.push(BindValue::Text(modifier));
                let comparator = if c.operation == "inLast" { ">=" } else { "<" };
                return Ok(format!(
                    "{} {} date('now', 'localtime', ?)",
                    CAPTURE_DATE, comparator
                ));
            }
            "today" => return Ok(format!("{} = date('now', 'localtime')", CAPTURE_DATE)),
            "yesterday" => {
                return Ok(format!(
                    "{} = date('now', 'localtime', '-1 day')",
                    CAPTURE_DATE
                ))
            }
            "thisMonth" => {
                return Ok(
                    "substr(i.captureTime, 1, 7) = strftime('%Y-%m', 'now', 'localtime')"
                        .to_string(),
                )
            }
            "thisYear" => {
                return Ok(
                    "substr(i.captureTime, 1, 4) = strftime('%Y', 'now', 'localtime')".to_string(),
                )
            }
            _ => return Err(unsupported(c)),
        };

        self.date_bind(&c.value, c)?;
        Ok(format!("{} {} ?", CAPTURE_DATE, comparator))
    }
}
