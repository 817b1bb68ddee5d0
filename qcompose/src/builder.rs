use std::fmt::Write;

use crate::value::Value;

/// A rendered statement: SQL text and its positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

pub struct QueryBuilder {
    indent: u16,
    buf: String,
    params: Vec<Value>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            indent: 0,
            buf: String::new(),
            params: Vec::new(),
        }
    }

    pub fn build(self) -> Statement {
        Statement {
            sql: self.buf,
            params: self.params,
        }
    }

    pub fn buf_mut(&mut self) -> &mut String {
        &mut self.buf
    }

    pub fn outdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn newline_indent(&mut self) {
        self.indent += 1;
        self.newline();
    }

    pub fn newline_outdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.push("\n");
        self.buf.extend((0..self.indent).map(|_| ' '));
    }

    pub fn push(&mut self, str: &str) {
        self.buf.push_str(str);
    }

    /// Bind a value as the next positional parameter, `$1`, `$2`, ...
    ///
    /// `NULL` is written inline, since it has no type to bind with.
    pub fn push_param(&mut self, value: Value) {
        if value.is_null() {
            self.push("NULL");
            return;
        }

        self.params.push(value);
        // Writing to a String can't fail
        let _ = write!(self.buf, "${}", self.params.len());
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_numbered_in_order() {
        let mut builder = QueryBuilder::new();
        builder.push_param(Value::Int(1));
        builder.push(", ");
        builder.push_param(Value::Null);
        builder.push(", ");
        builder.push_param(Value::from("x"));

        let statement = builder.build();
        assert_eq!(statement.sql, "$1, NULL, $2");
        assert_eq!(statement.params, vec![Value::Int(1), Value::from("x")]);
    }

    #[test]
    fn indentation() {
        let mut builder = QueryBuilder::new();
        builder.push("SELECT");
        builder.newline_indent();
        builder.push("a");
        builder.newline_outdent();
        builder.push("FROM t");

        assert_eq!(builder.build().sql, "SELECT\n a\nFROM t");
    }
}
