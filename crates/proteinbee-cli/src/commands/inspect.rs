use super::parse_motif;
use crate::cli::InspectArgs;
use crate::error::Result;
use itertools::Itertools;

pub fn run(args: InspectArgs) -> Result<()> {
    for line in render(&args)? {
        println!("{}", line);
    }
    Ok(())
}

fn render(args: &InspectArgs) -> Result<Vec<String>> {
    let motif = parse_motif(&args.motif, args.delimiter)?;
    let counts = motif
        .get_selector_counts()
        .into_iter()
        .map(|(selector, count)| format!("{} x{}", selector, count))
        .join(", ");

    Ok(vec![
        format!("motif:           {}", motif),
        format!("selectors:       {}", motif.selector_iter().join(", ")),
        format!("segments:        {}", motif.segment_iter().join(", ")),
        format!("selector counts: {}", counts),
        format!("chains:          {}", motif.split_by_chain().count()),
        format!("total length:    {}", motif.total_length()),
    ])
}
