//! Parser for the human-editable Bril text format.
//!
//! ```text
//! # imports come first, then functions
//! import helpers;
//!
//! main (a: int) (b: int) {
//!   sum: int = add a b;
//!   print sum;
//! }
//! ```
//!
//! The parser produces the same [`RawProgram`] the JSON loader
//! deserializes, so both formats share validation. The [`fmt::Display`]
//! impls below render a loaded [`Program`] back into this form.

use super::{Function, Instruction, Literal, Operation, Program};
use super::raw::{RawArg, RawFunction, RawInstr, RawOp, RawProgram};
use anyhow::{Result, bail};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, one_of},
    combinator::{all_consuming, cut, map, map_res, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use num_bigint::BigInt;
use std::fmt;

/// Parses a whole module.
pub fn parse(src: &str) -> Result<RawProgram> {
    match all_consuming(module)(src) {
        Ok((_, program)) => Ok(program),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => {
            let rest = blank(err.input).map_or(err.input, |(rest, _)| rest);
            let line = src[..src.len() - rest.len()].matches('\n').count() + 1;
            let found: String = rest.chars().take_while(|c| *c != '\n').take(32).collect();
            if found.is_empty() {
                bail!("parse error at line {line}: unexpected end of input");
            }
            bail!("parse error at line {line}: unexpected `{found}`")
        }
        Err(nom::Err::Incomplete(_)) => bail!("parse error: unexpected end of input"),
    }
}

fn module(input: &str) -> IResult<&str, RawProgram> {
    let (input, imports) = many0(import)(input)?;
    let (input, functions) = many0(function)(input)?;
    let (input, _) = blank(input)?;
    Ok((input, RawProgram { functions, imports }))
}

fn import(input: &str) -> IResult<&str, String> {
    delimited(symbol("import"), cname, symbol(";"))(input)
}

/// `name arg* (: type)? { instr* }`
fn function(input: &str) -> IResult<&str, RawFunction> {
    let (input, name) = cname(input)?;
    let (input, args) = many0(arg)(input)?;
    let (input, ty) = opt(preceded(symbol(":"), cname))(input)?;
    // Once the body is open there is no other way to read the input.
    let (input, instrs) = preceded(
        symbol("{"),
        cut(terminated(many0(instruction), symbol("}"))),
    )(input)?;
    Ok((
        input,
        RawFunction {
            name,
            args,
            ty,
            instrs,
        },
    ))
}

fn arg(input: &str) -> IResult<&str, RawArg> {
    alt((
        map(
            delimited(
                symbol("("),
                pair(terminated(ident, symbol(":")), cname),
                symbol(")"),
            ),
            |(name, ty)| RawArg { name, ty: Some(ty) },
        ),
        map(ident, |name| RawArg { name, ty: None }),
    ))(input)
}

fn instruction(input: &str) -> IResult<&str, RawInstr> {
    alt((
        map(preceded(symbol("def"), function), RawInstr::Function),
        map(constant, RawInstr::Op),
        map(value_op, RawInstr::Op),
        map(effect_op, RawInstr::Op),
        map(terminated(ident, symbol(":")), RawInstr::Label),
    ))(input)
}

/// `dest: type = const literal;`
fn constant(input: &str) -> IResult<&str, RawOp> {
    let (input, (dest, ty)) = destination(input)?;
    let (input, literal) = delimited(symbol("const"), literal, symbol(";"))(input)?;
    Ok((
        input,
        RawOp {
            op: "const".to_string(),
            dest: Some(dest),
            ty,
            value: Some(literal),
            ..RawOp::default()
        },
    ))
}

/// `dest: type = op args*;`, the type may be left out.
fn value_op(input: &str) -> IResult<&str, RawOp> {
    let (input, (dest, ty)) = destination(input)?;
    let (input, (op, args)) = terminated(pair(cname, many0(ident)), symbol(";"))(input)?;
    Ok((
        input,
        RawOp {
            op,
            args,
            dest: Some(dest),
            ty,
            ..RawOp::default()
        },
    ))
}

/// `op args*;`
fn effect_op(input: &str) -> IResult<&str, RawOp> {
    let (input, (op, args)) = terminated(pair(cname, many0(ident)), symbol(";"))(input)?;
    Ok((
        input,
        RawOp {
            op,
            args,
            ..RawOp::default()
        },
    ))
}

/// `dest (: type)? =`. After a label, `l: x = ...` reads as a typed
/// destination `l` of type `x`, so untyped destinations cannot follow a label.
fn destination(input: &str) -> IResult<&str, (String, Option<String>)> {
    terminated(
        pair(ident, opt(preceded(symbol(":"), cname))),
        symbol("="),
    )(input)
}

fn literal(input: &str) -> IResult<&str, Literal> {
    preceded(
        blank,
        alt((
            map(tag("true"), |_| Literal::Bool(true)),
            map(tag("false"), |_| Literal::Bool(false)),
            map_res(recognize(pair(opt(one_of("+-")), digit1)), |digits: &str| {
                digits.parse::<BigInt>().map(Literal::Int)
            }),
        )),
    )(input)
}

/// Variable and label names: `_`, `%`, `.`, letters and digits, not leading
/// with a digit or a dot.
fn ident(input: &str) -> IResult<&str, String> {
    fn is_start(c: char) -> bool {
        c == '_' || c == '%' || c.is_ascii_alphabetic()
    }
    fn is_rest(c: char) -> bool {
        is_start(c) || c == '.' || c.is_ascii_digit()
    }
    map(
        preceded(blank, recognize(pair(take_while1(is_start), take_while(is_rest)))),
        str::to_string,
    )(input)
}

/// Function, opcode and type names.
fn cname(input: &str) -> IResult<&str, String> {
    fn is_start(c: char) -> bool {
        c == '_' || c.is_ascii_alphabetic()
    }
    fn is_rest(c: char) -> bool {
        c == '_' || c.is_ascii_alphanumeric()
    }
    map(
        preceded(blank, recognize(pair(take_while1(is_start), take_while(is_rest)))),
        str::to_string,
    )(input)
}

fn symbol<'a>(s: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(blank, tag(s))
}

/// Skips whitespace and `#` comments.
fn blank(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            multispace1,
            recognize(pair(char('#'), not_line_ending)),
        ))),
    )(input)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            write_function(f, function, "")?;
        }
        Ok(())
    }
}

/// Writes `name args: type {`, the body and the closing brace. Nested
/// definitions are written with `def` and indented one more level.
fn write_function(f: &mut fmt::Formatter<'_>, function: &Function, indent: &str) -> fmt::Result {
    f.write_str(&function.name)?;
    for param in &function.params {
        match param.ty {
            Some(ty) => write!(f, " ({}: {ty})", param.name)?,
            None => write!(f, " {}", param.name)?,
        }
    }
    if let Some(ty) = function.return_type {
        write!(f, ": {ty}")?;
    }
    writeln!(f, " {{")?;
    let body = format!("{indent}  ");
    for instr in &function.instrs {
        match instr {
            Instruction::Label(label) => writeln!(f, "{indent}{label}:")?,
            Instruction::Const { dest, ty, value } => {
                writeln!(f, "{body}{dest}: {ty} = const {value};")?
            }
            Instruction::Operation(operation) => writeln!(f, "{body}{operation};")?,
            Instruction::Function(nested) => {
                write!(f, "{body}def ")?;
                write_function(f, nested, &body)?;
            }
        }
    }
    writeln!(f, "{indent}}}")
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.dest, self.ty) {
            (Some(dest), Some(ty)) => write!(f, "{dest}: {ty} = ")?,
            (Some(dest), None) => write!(f, "{dest} = ")?,
            (None, _) => {}
        }
        write!(f, "{}", self.op)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{BinOp, Opcode, Type};

    #[test]
    fn test_parse_function_header() {
        let raw = parse("add5 (n: int): int { ret n; }").unwrap();
        let f = &raw.functions[0];
        assert_eq!(f.name, "add5");
        assert_eq!(f.args.len(), 1);
        assert_eq!(f.args[0].name, "n");
        assert_eq!(f.args[0].ty.as_deref(), Some("int"));
        assert_eq!(f.ty.as_deref(), Some("int"));
    }

    #[test]
    fn test_untyped_argument() {
        let raw = parse("main x { print x; }").unwrap();
        assert_eq!(raw.functions[0].args[0].name, "x");
        assert_eq!(raw.functions[0].args[0].ty, None);
    }

    #[test]
    fn test_instruction_shapes() {
        let src = r#"
            # leading comment
            main {
              v0: int = const -12;   # trailing comment
              b: bool = const true;
            loop:
              v1: int = add v0 v0;
              print v1 b;
              br b loop end.ok;
            end.ok:
              ret;
            }
        "#;
        let program = Program::from_text(src).unwrap();
        let instrs = &program.functions[0].instrs;
        assert_eq!(instrs.len(), 8);
        assert_eq!(
            instrs[0],
            Instruction::Const {
                dest: "v0".to_string(),
                ty: Type::Int,
                value: Literal::Int(BigInt::from(-12)),
            }
        );
        assert_eq!(instrs[2], Instruction::Label("loop".to_string()));
        assert!(matches!(
            &instrs[3],
            Instruction::Operation(Operation { op: Opcode::Binary(BinOp::Add), dest: Some(d), ty: Some(Type::Int), .. })
                if d == "v1"
        ));
        assert!(matches!(
            &instrs[5],
            Instruction::Operation(Operation { op: Opcode::Br, args, dest: None, .. })
                if args.as_slice() == ["b", "loop", "end.ok"]
        ));
        assert_eq!(instrs[6], Instruction::Label("end.ok".to_string()));
    }

    #[test]
    fn test_nested_definition() {
        let src = "main { def helper: int { one: int = const 1; ret one; } x: int = call helper; }";
        let program = Program::from_text(src).unwrap();
        let instrs = &program.functions[0].instrs;
        assert!(matches!(&instrs[0], Instruction::Function(f) if f.name == "helper" && f.instrs.len() == 2));
        assert!(matches!(
            &instrs[1],
            Instruction::Operation(Operation { op: Opcode::Call, .. })
        ));
    }

    #[test]
    fn test_names_starting_with_keywords() {
        let src = "main { default: int = const 1; constant: int = id default; important: int = id constant; }";
        let program = Program::from_text(src).unwrap();
        assert_eq!(program.functions[0].instrs.len(), 3);
    }

    #[test]
    fn test_imports() {
        let raw = parse("import lib; import more;\nmain { }").unwrap();
        assert_eq!(raw.imports, ["lib", "more"]);
        assert_eq!(raw.functions.len(), 1);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse("main {\n  x: int = const 1;\n  = oops;\n}").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("= oops;"), "{msg}");
    }

    #[test]
    fn test_unknown_opcode_in_text() {
        assert!(Program::from_text("main { x: int = frobnicate a b; }").is_err());
    }

    #[test]
    fn test_untyped_destination() {
        let program = Program::from_text("main { a: int = const 1; b = id a; }").unwrap();
        assert!(matches!(
            &program.functions[0].instrs[1],
            Instruction::Operation(Operation { dest: Some(d), ty: None, .. }) if d == "b"
        ));
    }

    #[test]
    fn test_render_layout() {
        let src = "f (n: int) x: bool { loop: v: int = const -3; br x loop done; done: print; def g { nop; } }";
        let program = Program::from_text(src).unwrap();
        let expected = "\
f (n: int) x: bool {
loop:
  v: int = const -3;
  br x loop done;
done:
  print;
  def g {
    nop;
  }
}
";
        assert_eq!(program.to_string(), expected);
    }

    #[test]
    fn test_render_round_trip() {
        let src = r#"
            main (n: int) flag {
              def helper (x: int): int {
                one: int = const 1;
                y: int = add x one;
                ret y;
              }
              big: int = const 123456789012345678901234567890;
              t: bool = const true;
            top:
              r: int = call helper n;
              c: bool = lt r big;
              br c top end.ok;
            end.ok:
              print r t;
              print;
              ret;
            }
            other: bool {
              f: bool = const false;
              ret f;
            }
        "#;
        let program = Program::from_text(src).unwrap();
        let reparsed = Program::from_text(&program.to_string()).unwrap();
        assert_eq!(reparsed, program);
    }

    #[test]
    fn test_render_json_program() {
        let src = r#"{"functions": [{"name": "main", "instrs": [
            {"op": "const", "dest": "a", "type": "int", "value": 2},
            {"op": "mul", "dest": "b", "args": ["a", "a"]},
            {"op": "call", "funcs": ["show"], "args": ["b"]}
        ]}]}"#;
        let program = Program::from_json(src).unwrap();
        let text = program.to_string();
        assert_eq!(text, "main {\n  a: int = const 2;\n  b = mul a a;\n  call show b;\n}\n");
        assert_eq!(Program::from_text(&text).unwrap(), program);
    }
}
