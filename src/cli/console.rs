// Interactive operator menu: mine a block or print the chain.
// Reads from any BufRead so tests can script it; main passes stdin/stdout.

use crate::core::Block;
use crate::network::Node;
use std::io::{self, BufRead, Write};

pub fn run_console<R, W>(node: &Node, mut input: R, output: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let label = node.label().to_string();
    loop {
        writeln!(
            output,
            "\n[{label}] Choose an option:\n1. Mine Block\n2. Print Blockchain"
        )?;
        write!(output, "Enter choice: ")?;
        output.flush()?;

        let Some(choice) = read_line(&mut input)? else {
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                write!(output, "Enter data for block: ")?;
                output.flush()?;
                let Some(data) = read_line(&mut input)? else {
                    return Ok(());
                };
                match node.submit_data(&data) {
                    Ok(_) => writeln!(
                        output,
                        "[{label}] Block mined and broadcasted: {data} (chain length {})",
                        node.chain().len()
                    )?,
                    Err(e) => writeln!(output, "[{label}] Block invalid, not added: {e}")?,
                }
            }
            "2" => {
                writeln!(output, "\n[{label}] Current Blockchain:")?;
                for block in node.blocks() {
                    print_block(output, &block)?;
                }
            }
            _ => writeln!(output, "Invalid choice.")?,
        }
    }
}

fn print_block<W: Write>(output: &mut W, block: &Block) -> io::Result<()> {
    writeln!(
        output,
        "Index: {}, Data: {}, Hash: {}...",
        block.get_index(),
        block.get_data(),
        block.short_hash()
    )
}

// One line without its terminator; None at end of input
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}
