use std::iter::Peekable;

use crate::{
    ast::{Block, Expr, Param, Statement},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, expect, parse_full_expression, skip_newlines},
        value::core::TYPE_NAMES,
    },
};

/// Parses a single statement.
///
/// A statement may be one of:
/// - a control structure (`if`, `while`, `until`, `do`, `for`),
/// - a named function definition,
/// - a control signal (`break`, `continue`, `return`),
/// - an expression used as a statement.
///
/// `breakable` and `returnable` describe the enclosing construct; the
/// signal keywords are rejected here, at parse time, when no construct
/// above can absorb them.
///
/// # Errors
/// Any [`ParseError`] raised while consuming the statement.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>,
                              breakable: bool,
                              returnable: bool)
                              -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.peek().copied() else {
        return Err(ParseError::UnexpectedEndOfInput { line: 0 });
    };
    let line = *line;
    match token {
        Token::If => {
            tokens.next();
            parse_if(tokens, line, breakable, returnable)
        },
        Token::While => {
            tokens.next();
            parse_loop_head(tokens, line, false, returnable)
        },
        Token::Until => {
            tokens.next();
            parse_loop_head(tokens, line, true, returnable)
        },
        Token::Do => {
            tokens.next();
            parse_do(tokens, line, returnable)
        },
        Token::For => {
            tokens.next();
            parse_for(tokens, line, returnable)
        },
        Token::Func if starts_function_definition(tokens) => {
            tokens.next();
            parse_function_definition(tokens, line)
        },
        Token::Break => {
            tokens.next();
            if breakable {
                Ok(Statement::Break { line })
            } else {
                Err(ParseError::BreakOutsideLoop { keyword: "break".to_string(),
                                                   line })
            }
        },
        Token::Continue => {
            tokens.next();
            if breakable {
                Ok(Statement::Continue { line })
            } else {
                Err(ParseError::BreakOutsideLoop { keyword: "continue".to_string(),
                                                   line })
            }
        },
        Token::Return => {
            tokens.next();
            if !returnable {
                return Err(ParseError::ReturnOutsideFunction { line });
            }
            let value = if statement_ends(tokens) {
                None
            } else {
                Some(parse_full_expression(tokens)?)
            };
            Ok(Statement::Return { value, line })
        },
        _ => {
            let expr = parse_full_expression(tokens)?;
            Ok(Statement::Expression { expr, line })
        },
    }
}

/// Parses a statement block: either `{ ... }` or a single statement.
///
/// The signal flags become the block's capabilities; loop and function
/// parsers override them for their bodies.
///
/// # Errors
/// Any [`ParseError`] raised while consuming the block.
pub fn parse_block<'a, I>(tokens: &mut Peekable<I>,
                          breakable: bool,
                          returnable: bool)
                          -> ParseResult<Block>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    skip_newlines(tokens);
    let Some((token, line)) = tokens.peek().copied() else {
        return Err(ParseError::UnexpectedEndOfInput { line: 0 });
    };
    let line = *line;
    if *token == Token::LBrace {
        tokens.next();
        let mut statements = Vec::new();
        loop {
            while let Some((Token::NewLine | Token::Semicolon, _)) = tokens.peek() {
                tokens.next();
            }
            match tokens.peek() {
                Some((Token::RBrace, _)) => {
                    tokens.next();
                    break;
                },
                Some(_) => statements.push(parse_statement(tokens, breakable, returnable)?),
                None => return Err(ParseError::UnexpectedEndOfInput { line }),
            }
        }
        return Ok(Block { statements,
                          breakable,
                          returnable,
                          line });
    }
    let statement = parse_statement(tokens, breakable, returnable)?;
    Ok(Block { statements: vec![statement],
               breakable,
               returnable,
               line })
}

/// Parses a parenthesized parameter list.
///
/// Each parameter is `name` or `name: type`; any other shape is rejected
/// here, before evaluation. Names must be unique and type constraints
/// must name a public type. (Optional parameters exist only on
/// host-registered builtins, not in script definitions.)
///
/// # Errors
/// [`ParseError::InvalidParameter`] for any violated shape rule.
pub fn parse_params<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Param>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let open_line = expect(tokens, &Token::LParen, "Expected '(' before parameters")?;
    let mut params: Vec<Param> = Vec::new();
    loop {
        skip_newlines(tokens);
        if let Some((Token::RParen, _)) = tokens.peek() {
            tokens.next();
            break;
        }
        let name = match tokens.next() {
            Some((Token::Symbol(name), _)) => name.clone(),
            Some((other, line)) => {
                return Err(ParseError::InvalidParameter { details: format!("expected a name, found {other:?}"),
                                                          line:    *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: open_line }),
        };
        let type_name = if let Some((Token::Colon, _)) = tokens.peek() {
            tokens.next();
            match tokens.next() {
                Some((Token::Symbol(type_name), line)) => {
                    if !TYPE_NAMES.contains(&type_name.as_str()) {
                        return Err(ParseError::InvalidParameter { details: format!("unknown type '{type_name}'"),
                                                                  line:    *line, });
                    }
                    type_name.clone()
                },
                Some((other, line)) => {
                    return Err(ParseError::InvalidParameter { details: format!("expected a type name, found {other:?}"),
                                                              line:    *line, });
                },
                None => return Err(ParseError::UnexpectedEndOfInput { line: open_line }),
            }
        } else {
            "any".to_string()
        };
        if params.iter().any(|p| p.name == name) {
            return Err(ParseError::InvalidParameter { details: format!("duplicate parameter '{name}'"),
                                                      line:    open_line, });
        }
        params.push(Param { name,
                            type_name,
                            optional: false });
        skip_newlines(tokens);
        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((Token::RParen, _)) => {},
            Some((other, line)) => {
                return Err(ParseError::InvalidParameter { details: format!("expected ',' or ')', found {other:?}"),
                                                          line:    *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: open_line }),
        }
    }
    Ok(params)
}

/// `if (cond) body`, with any chain of `else if` branches and an optional
/// final `else`. Bodies inherit the surrounding signal capabilities.
fn parse_if<'a, I>(tokens: &mut Peekable<I>,
                   line: usize,
                   breakable: bool,
                   returnable: bool)
                   -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut branches = Vec::new();
    let condition = parse_condition(tokens)?;
    let body = parse_block(tokens, breakable, returnable)?;
    branches.push((condition, body));

    let mut else_block = None;
    while takes_else(tokens) {
        if let Some((Token::If, _)) = tokens.peek() {
            tokens.next();
            let condition = parse_condition(tokens)?;
            let body = parse_block(tokens, breakable, returnable)?;
            branches.push((condition, body));
        } else {
            else_block = Some(parse_block(tokens, breakable, returnable)?);
            break;
        }
    }
    Ok(Statement::If { branches,
                       else_block,
                       line })
}

/// Commits to an `else` continuation if one follows, looking across
/// newlines with a cloned iterator so a plain statement on the next line
/// is left untouched.
fn takes_else<'a, I>(tokens: &mut Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut probe = tokens.clone();
    while let Some((Token::NewLine | Token::Semicolon, _)) = probe.peek() {
        probe.next();
    }
    if let Some((Token::Else, _)) = probe.peek() {
        probe.next();
        skip_newlines(&mut probe);
        *tokens = probe;
        true
    } else {
        false
    }
}

/// `while (cond) body` / `until (cond) body`.
fn parse_loop_head<'a, I>(tokens: &mut Peekable<I>,
                          line: usize,
                          negate: bool,
                          returnable: bool)
                          -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let condition = parse_condition(tokens)?;
    let body = parse_block(tokens, true, returnable)?;
    Ok(Statement::Loop { condition,
                         body,
                         test_after: false,
                         negate,
                         line })
}

/// `do body while (cond)` / `do body until (cond)`.
fn parse_do<'a, I>(tokens: &mut Peekable<I>, line: usize, returnable: bool) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let body = parse_block(tokens, true, returnable)?;
    skip_newlines(tokens);
    let negate = match tokens.next() {
        Some((Token::While, _)) => false,
        Some((Token::Until, _)) => true,
        Some((other, line)) => {
            return Err(ParseError::UnexpectedToken { token: format!("Expected 'while' or 'until' after do body, found {other:?}"),
                                                     line:  *line, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { line }),
    };
    let condition = parse_condition(tokens)?;
    Ok(Statement::Loop { condition,
                         body,
                         test_after: true,
                         negate,
                         line })
}

/// `for (init; cond; step) body` — two or three clauses, each of which
/// may be empty; an empty condition loops forever.
fn parse_for<'a, I>(tokens: &mut Peekable<I>, line: usize, returnable: bool) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LParen, "Expected '(' after 'for'")?;
    skip_newlines(tokens);
    let init = if let Some((Token::Semicolon, _)) = tokens.peek() {
        None
    } else {
        let init_line = tokens.peek().map_or(line, |(_, l)| *l);
        Some(Box::new(Statement::Expression { expr: parse_full_expression(tokens)?,
                                              line: init_line }))
    };
    expect(tokens, &Token::Semicolon, "Expected ';' after for-initializer")?;
    skip_newlines(tokens);
    let condition = if let Some((Token::Semicolon, _)) = tokens.peek() {
        None
    } else {
        Some(parse_full_expression(tokens)?)
    };
    // The step clause is optional: `for (init; cond)` is the two-clause
    // form, `for (init; cond; step)` the three-clause form.
    let step = if let Some((Token::Semicolon, _)) = tokens.peek() {
        tokens.next();
        skip_newlines(tokens);
        if let Some((Token::RParen, _)) = tokens.peek() {
            None
        } else {
            let step_line = tokens.peek().map_or(line, |(_, l)| *l);
            Some(Box::new(Statement::Expression { expr: parse_full_expression(tokens)?,
                                                  line: step_line }))
        }
    } else {
        None
    };
    expect(tokens, &Token::RParen, "Expected ')' after for clauses")?;
    let body = parse_block(tokens, true, returnable)?;
    Ok(Statement::For { init,
                        condition,
                        step,
                        body,
                        line })
}

/// `func name(params) body` in statement position.
fn parse_function_definition<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = match tokens.next() {
        Some((Token::Symbol(name), _)) => name.clone(),
        Some((other, line)) => {
            return Err(ParseError::UnexpectedToken { token: format!("Expected a function name, found {other:?}"),
                                                     line:  *line, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { line }),
    };
    let params = parse_params(tokens)?;
    let body = parse_block(tokens, false, true)?;
    Ok(Statement::FuncDef { name,
                            params,
                            body,
                            line })
}

/// Whether a `func` keyword begins a named definition rather than an
/// anonymous function expression.
fn starts_function_definition<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut probe = tokens.clone();
    probe.next();
    matches!(probe.next(), Some((Token::Symbol(_), _)))
}

/// A parenthesized single-expression condition.
fn parse_condition<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    skip_newlines(tokens);
    expect(tokens, &Token::LParen, "Expected '(' before condition")?;
    skip_newlines(tokens);
    let condition = parse_full_expression(tokens)?;
    skip_newlines(tokens);
    expect(tokens, &Token::RParen, "Expected ')' after condition")?;
    Ok(condition)
}

fn statement_ends<'a, I>(tokens: &mut Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    matches!(tokens.peek(),
             None | Some((Token::NewLine | Token::Semicolon | Token::RBrace, _)))
}

#[cfg(test)]
mod tests {
    use super::parse_statement;
    use crate::{
        ast::Statement,
        interpreter::lexer::tokenize,
    };

    fn parse(source: &str) -> Result<Statement, crate::error::ParseError> {
        let tokens = tokenize(source).unwrap();
        let mut iter = tokens.iter().peekable();
        parse_statement(&mut iter, false, false)
    }

    #[test]
    fn signals_are_position_checked() {
        assert!(parse("break").is_err());
        assert!(parse("continue").is_err());
        assert!(parse("return 1").is_err());
        assert!(parse("while (true) break").is_ok());
        assert!(parse("func f() return 1").is_ok());
        // A loop body is not returnable by itself.
        assert!(parse("while (true) return 1").is_err());
    }

    #[test]
    fn for_clause_shapes() {
        assert!(parse("for (i = 0; i < 3; i += 1) print(i)").is_ok());
        assert!(parse("for (;;) break").is_ok());
        assert!(parse("for (i = 0; i < 3) print(i)").is_ok());
        assert!(parse("for (i = 0) print(i)").is_err());
    }

    #[test]
    fn parameter_shapes() {
        assert!(parse("func f(x, y: real) x").is_ok());
        assert!(parse("func f(?a, b) a").is_err());
        assert!(parse("func f(x, x) x").is_err());
        assert!(parse("func f(x: matrix) x").is_err());
    }

    #[test]
    fn else_binds_across_newlines() {
        let statement = parse("if (false) 1\nelse 2").unwrap();
        let Statement::If { branches, else_block, .. } = statement else {
            panic!("expected an if statement");
        };
        assert_eq!(branches.len(), 1);
        assert!(else_block.is_some());
    }

    #[test]
    fn do_loops_take_both_tests() {
        assert!(parse("do { x = 1 } while (false)").is_ok());
        assert!(parse("do { x = 1 } until (true)").is_ok());
        assert!(parse("do { x = 1 }").is_err());
    }
}
