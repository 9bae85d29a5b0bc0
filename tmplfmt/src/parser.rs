//! The template parser.
//!
//! Templates are parsed in a single pass by a small state machine.  Literal
//! text alternates with injected variables in braces.  Inside braces the
//! parser keeps an explicit stack of pending calls: the bottom entry is the
//! root call of the injected variable and every entry above it is a nested
//! call in an argument list of the entry below.
use crate::ast::{Argument, Node, ParseTree, VariableCall};
use crate::error::Error;

/// The maximum number of calls open at once inside one injected variable.
const MAX_NESTING: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Ident,
    Args,
}

/// The argument currently being read by a call.
#[derive(Debug)]
enum PendingArg {
    Unset,
    Str(String),
    Number(String),
    /// The argument is the call one level up on the stack.
    Nested,
}

#[derive(Debug)]
struct PendingCall {
    path: String,
    args: Vec<Argument>,
    state: CallState,
    arg: PendingArg,
    in_quote: bool,
}

impl PendingCall {
    fn new(path: String) -> PendingCall {
        PendingCall {
            path,
            args: Vec::new(),
            state: CallState::Ident,
            arg: PendingArg::Unset,
            in_quote: false,
        }
    }

    /// Pushes the pending literal argument, if any, and resets it.
    fn finish_arg(&mut self, idx: usize) -> Result<(), Error> {
        match std::mem::replace(&mut self.arg, PendingArg::Unset) {
            PendingArg::Unset | PendingArg::Nested => {}
            PendingArg::Str(s) => self.args.push(Argument::Str(s)),
            PendingArg::Number(text) => match text.trim().parse::<f64>() {
                Ok(num) => self.args.push(Argument::Number(num)),
                Err(_) => {
                    return Err(Error::syntax(
                        format!("invalid numeric argument {text:?}"),
                        Some(idx),
                    ))
                }
            },
        }
        Ok(())
    }

    fn into_call(self) -> VariableCall {
        VariableCall {
            path: self.path,
            args: self.args,
        }
    }
}

struct Parser {
    nodes: Vec<Node>,
    text: String,
    in_var: bool,
    var_start: usize,
    stack: Vec<PendingCall>,
    /// The root call once it is complete but before its closing brace.
    closed: Option<VariableCall>,
    escape_next: bool,
}

fn unexpected(c: char, idx: usize) -> Error {
    Error::syntax(format!("unexpected character {c:?}"), Some(idx))
}

impl Parser {
    fn new() -> Parser {
        Parser {
            nodes: Vec::new(),
            text: String::new(),
            in_var: false,
            var_start: 0,
            stack: Vec::new(),
            closed: None,
            escape_next: false,
        }
    }

    fn parse(mut self, source: &str) -> Result<ParseTree, Error> {
        for (idx, c) in source.chars().enumerate() {
            if self.in_var {
                ok!(self.step_var(c, idx));
            } else {
                self.step_text(c, idx);
            }
        }

        if self.in_var {
            return Err(Error::syntax(
                "unterminated injected variable",
                Some(self.var_start),
            ));
        }
        if !self.text.is_empty() {
            self.nodes.push(Node::Text(self.text));
        }
        Ok(ParseTree { nodes: self.nodes })
    }

    fn step_text(&mut self, c: char, idx: usize) {
        if self.escape_next {
            self.text.push(c);
            self.escape_next = false;
        } else if c == '\\' {
            self.escape_next = true;
        } else if c == '{' {
            if !self.text.is_empty() {
                self.nodes.push(Node::Text(std::mem::take(&mut self.text)));
            }
            self.in_var = true;
            self.var_start = idx;
            self.stack.push(PendingCall::new(String::new()));
        } else {
            self.text.push(c);
        }
    }

    fn step_var(&mut self, c: char, idx: usize) -> Result<(), Error> {
        let depth = self.stack.len();
        let call = match self.stack.last_mut() {
            Some(call) => call,
            None if c == '}' => return self.exit_var(),
            None => return Err(unexpected(c, idx)),
        };

        if call.state == CallState::Ident {
            match c {
                '(' => call.state = CallState::Args,
                ',' => self.return_to_parent(),
                // a bare identifier followed by `)` also closes the call
                // it is an argument of
                ')' => {
                    self.return_to_parent();
                    self.return_to_parent();
                }
                '}' => {
                    if self.stack.len() > 1 {
                        return Err(Error::syntax("unclosed function", Some(idx)));
                    }
                    self.return_to_parent();
                    return self.exit_var();
                }
                c => call.path.push(c),
            }
            return Ok(());
        }

        if call.in_quote {
            if self.escape_next {
                self.escape_next = false;
                push_arg_char(call, c);
            } else if c == '\\' {
                self.escape_next = true;
            } else if c == '"' {
                call.in_quote = false;
            } else {
                push_arg_char(call, c);
            }
            return Ok(());
        }

        if c == ')' {
            ok!(call.finish_arg(idx));
            self.return_to_parent();
        } else if c == ',' {
            ok!(call.finish_arg(idx));
        } else if let PendingArg::Number(ref mut text) = call.arg {
            // validated once the argument is complete
            text.push(c);
        } else if c == ' ' {
            // whitespace between arguments
        } else if c == '"' || c.is_ascii_digit() {
            if !matches!(call.arg, PendingArg::Unset) {
                return Err(unexpected(c, idx));
            }
            if c == '"' {
                call.arg = PendingArg::Str(String::new());
                call.in_quote = true;
            } else {
                call.arg = PendingArg::Number(c.to_string());
            }
        } else if matches!(call.arg, PendingArg::Unset) {
            if depth >= MAX_NESTING {
                return Err(Error::syntax(
                    "template exceeds maximum nesting depth",
                    Some(idx),
                ));
            }
            call.arg = PendingArg::Nested;
            self.stack.push(PendingCall::new(c.to_string()));
        } else {
            return Err(unexpected(c, idx));
        }
        Ok(())
    }

    /// Completes the call at the top of the stack.
    ///
    /// A nested call becomes the pending argument of its parent.  The root
    /// call moves to `closed` where it waits for the closing brace.  Once the
    /// root is closed this does nothing.
    fn return_to_parent(&mut self) {
        let call = match self.stack.pop() {
            Some(call) => call.into_call(),
            None => return,
        };
        match self.stack.last_mut() {
            Some(parent) => {
                parent.args.push(Argument::Var(call));
                parent.arg = PendingArg::Unset;
            }
            None => self.closed = Some(call),
        }
    }

    fn exit_var(&mut self) -> Result<(), Error> {
        if let Some(call) = self.closed.take() {
            if call.path.is_empty() {
                return Err(Error::syntax(
                    "empty injected variable",
                    Some(self.var_start),
                ));
            }
            self.nodes.push(Node::Var(call));
        }
        self.in_var = false;
        Ok(())
    }
}

fn push_arg_char(call: &mut PendingCall, c: char) {
    if let PendingArg::Str(ref mut s) = call.arg {
        s.push(c);
    }
}

/// Parses a template into a [`ParseTree`].
///
/// Fails with [`ErrorKind::SyntaxError`](crate::ErrorKind::SyntaxError) if
/// the template is malformed.  Offsets in errors are character positions.
///
/// ```
/// let tree = tmplfmt::parse_template("Hello {user.name}!").unwrap();
/// assert_eq!(tree.nodes.len(), 3);
/// ```
pub fn parse_template(source: &str) -> Result<ParseTree, Error> {
    let rv = Parser::new().parse(source);
    trace!(ok = rv.is_ok(), len = source.len(), "parsed template");
    rv
}
