//! Line-oriented program parser.
//!
//! One operation per line: `<mnemonic> <target>[,<source>]`, with `$i`
//! for direct and `$$i` for indirect operands and bare integers for
//! constants. A `;` starts a comment running to the end of the line;
//! comment-only lines become `nop` operations carrying the comment.
//! Mnemonics are case-insensitive and indentation is cosmetic.

use crate::operation::{OpKind, Operand, Operation};
use crate::program::Program;
use seqmine_core::{Error, Number, Result};

pub fn parse_str(text: &str) -> Result<Program> {
    parse_lines(text.lines())
}

/// Parses a program from an iterator of lines, e.g. a buffered file
/// reader.
pub fn parse_lines<I, S>(lines: I) -> Result<Program>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut program = Program::new();
    for (index, line) in lines.into_iter().enumerate() {
        if let Some(op) = parse_line(line.as_ref(), index + 1)? {
            program.push(op);
        }
    }
    Ok(program)
}

fn parse_line(line: &str, line_no: usize) -> Result<Option<Operation>> {
    let (code, comment) = match line.find(';') {
        Some(pos) => (&line[..pos], Some(line[pos + 1..].trim().to_string())),
        None => (line, None),
    };
    let code = code.trim();
    if code.is_empty() {
        // blank lines are dropped, comment-only lines are kept as nops
        return Ok(comment.map(Operation::comment_only));
    }

    let (mnemonic, rest) = match code.find(char::is_whitespace) {
        Some(pos) => (&code[..pos], code[pos..].trim()),
        None => (code, ""),
    };
    let kind = OpKind::from_mnemonic(mnemonic).ok_or_else(|| Error::Parse {
        line: line_no,
        msg: format!("invalid operation: {}", mnemonic),
    })?;

    let mut operands = Vec::new();
    if !rest.is_empty() {
        for field in rest.split(',') {
            operands.push(parse_operand(field.trim(), line_no)?);
        }
    }

    let mut op = Operation::new(kind);
    op.comment = comment;
    let meta = kind.meta();
    match (meta.num_operands, operands.len()) {
        (0, 0) => {}
        (1, 1) => op.target = operands.remove(0),
        (2, 2) => {
            op.target = operands.remove(0);
            op.source = operands.remove(0);
        }
        // lpb has an optional region length defaulting to 1
        (2, 1) if kind == OpKind::Lpb => {
            op.target = operands.remove(0);
            op.source = Operand::constant(1);
        }
        (expected, found) => {
            return Err(Error::Parse {
                line: line_no,
                msg: format!(
                    "{} expects {} operand(s), found {}",
                    meta.mnemonic, expected, found
                ),
            });
        }
    }
    Ok(Some(op))
}

fn parse_operand(text: &str, line_no: usize) -> Result<Operand> {
    if text.is_empty() {
        return Err(Error::Parse {
            line: line_no,
            msg: "empty operand".to_string(),
        });
    }
    if let Some(rest) = text.strip_prefix("$$") {
        return Ok(Operand::Indirect(parse_cell(rest, line_no)?));
    }
    if let Some(rest) = text.strip_prefix('$') {
        return Ok(Operand::Direct(parse_cell(rest, line_no)?));
    }
    // negative literals are accepted and clamp to zero, the value
    // domain being nonnegative
    if let Some(rest) = text.strip_prefix('-') {
        rest.parse::<Number>().map_err(|_| Error::Parse {
            line: line_no,
            msg: format!("invalid constant: {}", text),
        })?;
        return Ok(Operand::Constant(Number::zero()));
    }
    let value = text.parse::<Number>().map_err(|_| Error::Parse {
        line: line_no,
        msg: format!("invalid constant: {}", text),
    })?;
    Ok(Operand::Constant(value))
}

fn parse_cell(text: &str, line_no: usize) -> Result<u64> {
    text.parse::<u64>().map_err(|_| Error::Parse {
        line: line_no,
        msg: format!("invalid memory cell: ${}", text),
    })
}
