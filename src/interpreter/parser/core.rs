use std::iter::Peekable;

use crate::{
    ast::{CallArg, Expr},
    error::ParseError,
    interpreter::{
        lexer::Token,
        operators::{self, Assoc, COMMA_PRECEDENCE, TERNARY_PRECEDENCE},
        parser::statement::{parse_block, parse_params},
        value::complex::Complex,
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a full expression, including the comma operator.
///
/// This is the entry point for expression statements, parenthesized
/// expressions, and interpolation spans.
///
/// # Errors
/// Any [`ParseError`] raised while consuming the expression.
pub fn parse_full_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_binary(tokens, COMMA_PRECEDENCE, false)
}

/// Parses one element of a comma-separated list: everything binds except
/// the comma operator itself.
///
/// # Errors
/// Any [`ParseError`] raised while consuming the expression.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_binary(tokens, COMMA_PRECEDENCE + 1, false)
}

/// Precedence-climbing over the operator table.
///
/// `no_seq` disables the sequence operator `:` for the whole subtree; the
/// then-branch of a ternary parses with it set, so its terminating `:`
/// is not eaten as a sequence. Brackets reset the flag.
fn parse_binary<'a, I>(tokens: &mut Peekable<I>, min_prec: u8, no_seq: bool) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_unary(tokens)?;
    loop {
        let Some((token, line)) = tokens.peek().copied() else {
            break;
        };
        if *token == Token::Question && TERNARY_PRECEDENCE >= min_prec {
            tokens.next();
            skip_newlines(tokens);
            let then_branch = parse_binary(tokens, TERNARY_PRECEDENCE, true)?;
            expect(tokens, &Token::Colon, "Expected ':' in ternary expression")?;
            skip_newlines(tokens);
            // Right associative, so the else-branch re-enters at the same
            // level.
            let else_branch = parse_binary(tokens, TERNARY_PRECEDENCE, no_seq)?;
            left = Expr::Ternary { condition:   Box::new(left),
                                   then_branch: Box::new(then_branch),
                                   else_branch: Box::new(else_branch),
                                   line:        *line, };
            continue;
        }
        let Some((descriptor, op)) = operators::binary_for_token(token) else {
            break;
        };
        if descriptor.precedence < min_prec {
            break;
        }
        if no_seq && *token == Token::Colon {
            break;
        }
        tokens.next();
        skip_newlines(tokens);
        let next_min = match descriptor.assoc {
            Assoc::Left => descriptor.precedence + 1,
            Assoc::Right => descriptor.precedence,
        };
        let right = parse_binary(tokens, next_min, no_seq)?;
        left = Expr::Binary { op,
                              left: Box::new(left),
                              right: Box::new(right),
                              line: *line };
    }
    Ok(left)
}

fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if let Some((token, line)) = tokens.peek().copied()
       && let Some(op) = operators::unary_for_token(token)
    {
        tokens.next();
        let operand = parse_unary(tokens)?;
        return Ok(Expr::Unary { op,
                                operand: Box::new(operand),
                                line: *line });
    }
    parse_postfix(tokens)
}

fn parse_postfix<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut expr = parse_primary(tokens)?;
    loop {
        let Some((token, line)) = tokens.peek().copied() else {
            break;
        };
        match token {
            Token::Dot | Token::QuestionDot => {
                let optional = *token == Token::QuestionDot;
                tokens.next();
                let property = match tokens.next() {
                    Some((Token::Symbol(name), _)) => name.clone(),
                    Some((other, line)) => {
                        return Err(ParseError::UnexpectedToken { token: format!("Expected a member name, found {other:?}"),
                                                                 line:  *line, });
                    },
                    None => return Err(ParseError::UnexpectedEndOfInput { line: *line }),
                };
                expr = Expr::Member { object: Box::new(expr),
                                      property,
                                      optional,
                                      line: *line };
            },
            Token::LBracket => {
                tokens.next();
                skip_newlines(tokens);
                let key = parse_full_expression(tokens)?;
                skip_newlines(tokens);
                expect(tokens, &Token::RBracket, "Expected ']' after index")?;
                expr = Expr::Index { object: Box::new(expr),
                                     key:    Box::new(key),
                                     line:   *line, };
            },
            Token::LParen => {
                tokens.next();
                let args = parse_args(tokens)?;
                expr = Expr::Call { callee: Box::new(expr),
                                    args,
                                    line: *line };
            },
            _ => break,
        }
    }
    Ok(expr)
}

fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.next() else {
        return Err(ParseError::UnexpectedEndOfInput { line: 0 });
    };
    match token {
        Token::Number(number) => {
            let value = if number.imaginary {
                Complex::imaginary(number.value)
            } else {
                Complex::real(number.value)
            };
            Ok(Expr::Number { value, line: *line })
        },
        Token::Str(template) => {
            Ok(Expr::Str { template: template.clone(),
                           line:     *line, })
        },
        Token::CharLit(code) => {
            Ok(Expr::CharLit { code: *code,
                               line: *line })
        },
        Token::Symbol(name) => {
            Ok(Expr::Symbol { name: name.clone(),
                              line: *line })
        },
        Token::Func => parse_function_literal(tokens, *line),
        Token::LParen => {
            skip_newlines(tokens);
            let inner = parse_full_expression(tokens)?;
            skip_newlines(tokens);
            expect(tokens, &Token::RParen, "Expected ')'")?;
            Ok(inner)
        },
        Token::LBracket => {
            let elements = parse_elements(tokens, &Token::RBracket)?;
            Ok(Expr::ArrayLiteral { elements, line: *line })
        },
        Token::LBrace => parse_brace_literal(tokens, *line),
        other => {
            Err(ParseError::UnexpectedToken { token: format!("Unexpected {other:?} in expression"),
                                              line:  *line, })
        },
    }
}

/// `func name?(params) { ... }` in expression position.
fn parse_function_literal<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = match tokens.peek() {
        Some((Token::Symbol(name), _)) => {
            tokens.next();
            Some(name.clone())
        },
        _ => None,
    };
    let params = parse_params(tokens)?;
    let body = parse_block(tokens, false, true)?;
    Ok(Expr::Function { name,
                        params,
                        body,
                        line })
}

/// A brace literal: an empty or element set, or a map when the first
/// entry reads as `symbol:` or `"string":`.
fn parse_brace_literal<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut probe = tokens.clone();
    while let Some((Token::NewLine, _)) = probe.peek() {
        probe.next();
    }
    let first_is_key = matches!(probe.next(), Some((Token::Symbol(_) | Token::Str(_), _)));
    let map_literal = first_is_key && matches!(probe.peek(), Some((Token::Colon, _)));

    if map_literal {
        let mut entries = Vec::new();
        loop {
            skip_newlines(tokens);
            if let Some((Token::RBrace, _)) = tokens.peek() {
                tokens.next();
                break;
            }
            let key = parse_map_key(tokens)?;
            expect(tokens, &Token::Colon, "Expected ':' after map key")?;
            skip_newlines(tokens);
            let value = parse_expression(tokens)?;
            entries.push((key, value));
            skip_newlines(tokens);
            match tokens.peek() {
                Some((Token::Comma, _)) => {
                    tokens.next();
                },
                Some((Token::RBrace, _)) => {},
                Some((other, line)) => {
                    return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or '}}' in map literal, found {other:?}"),
                                                             line:  *line, });
                },
                None => return Err(ParseError::UnexpectedEndOfInput { line }),
            }
        }
        return Ok(Expr::MapLiteral { entries, line });
    }

    let elements = parse_elements(tokens, &Token::RBrace)?;
    Ok(Expr::SetLiteral { elements, line })
}

fn parse_map_key<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((Token::Symbol(name), _)) => Ok(name.clone()),
        Some((Token::Str(template), line)) => {
            if template.spans.is_empty() {
                Ok(template.text.clone())
            } else {
                Err(ParseError::UnexpectedToken { token: "Interpolation is not allowed in a map key".to_string(),
                                                  line:  *line, })
            }
        },
        Some((other, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected a map key, found {other:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Comma-separated expressions up to `close`, newlines free around the
/// separators.
fn parse_elements<'a, I>(tokens: &mut Peekable<I>, close: &Token) -> ParseResult<Vec<Expr>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut elements = Vec::new();
    loop {
        skip_newlines(tokens);
        match tokens.peek() {
            Some((token, _)) if *token == *close => {
                tokens.next();
                break;
            },
            Some(_) => {},
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
        elements.push(parse_expression(tokens)?);
        skip_newlines(tokens);
        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((token, _)) if *token == *close => {},
            Some((other, line)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or '{}', found {other:?}",
                                                                        close.bracket_symbol()),
                                                         line:  *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
    }
    Ok(elements)
}

/// Call arguments, each optionally spread with a leading `...`.
fn parse_args<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<CallArg>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut args = Vec::new();
    loop {
        skip_newlines(tokens);
        match tokens.peek() {
            Some((Token::RParen, _)) => {
                tokens.next();
                break;
            },
            Some(_) => {},
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
        let spread = if let Some((Token::Ellipsis, _)) = tokens.peek() {
            tokens.next();
            true
        } else {
            false
        };
        let expr = parse_expression(tokens)?;
        args.push(CallArg { expr, spread });
        skip_newlines(tokens);
        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((Token::RParen, _)) => {},
            Some((other, line)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or ')' in arguments, found {other:?}"),
                                                         line:  *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
    }
    Ok(args)
}

/// Skips statement-terminating newlines where the grammar allows an
/// expression to continue, such as after a consumed operator.
pub fn skip_newlines<'a, I>(tokens: &mut Peekable<I>)
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    while let Some((Token::NewLine, _)) = tokens.peek() {
        tokens.next();
    }
}

/// Consumes the expected token or fails with `message`.
pub fn expect<'a, I>(tokens: &mut Peekable<I>, expected: &Token, message: &str) -> ParseResult<usize>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((token, line)) if *token == *expected => Ok(*line),
        Some((other, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("{message}, found {other:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}
