//! Ornamental tree printer.

use crate::{Asn1, Content, Tlv};
use core::fmt;

/// Hex octets shown for a primitive payload before eliding.
const PREVIEW_OCTETS: usize = 24;

fn write_node(f: &mut fmt::Formatter<'_>, node: &Tlv<'_>, prefix: &str, last: bool) -> fmt::Result {
    let branch = if last { '└' } else { '├' };
    match node.content() {
        Content::Primitive(data) => {
            write!(f, "{}{}{} ", prefix, branch, node.tag().description())?;
            for b in data.iter().take(PREVIEW_OCTETS) {
                write!(f, "{:02x}", b)?;
            }
            if data.len() > PREVIEW_OCTETS {
                write!(f, "… ({} octets)", data.len())?;
            }
            writeln!(f)
        }
        Content::Constructed(level) => {
            writeln!(f, "{}{}{}┐", prefix, branch, node.tag().description())?;
            let child_prefix = format!("{}{} ", prefix, if last { ' ' } else { '│' });
            write_level(f, level, &child_prefix)
        }
    }
}

fn write_level(f: &mut fmt::Formatter<'_>, level: &Asn1<'_>, prefix: &str) -> fmt::Result {
    let count = level.len();
    for (i, node) in level.iter().enumerate() {
        write_node(f, node, prefix, i + 1 == count)?;
    }
    Ok(())
}

impl fmt::Display for Asn1<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_level(f, self, "")
    }
}

impl fmt::Display for Tlv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, "", true)
    }
}
