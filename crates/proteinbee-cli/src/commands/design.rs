use super::parse_motif;
use crate::cli::DesignArgs;
use crate::error::{CliError, Result};
use tracing::info;

pub fn run(args: DesignArgs) -> Result<()> {
    for line in render(&args)? {
        println!("{}", line);
    }
    Ok(())
}

fn render(args: &DesignArgs) -> Result<Vec<String>> {
    let motif = parse_motif(&args.motif, args.delimiter)?;
    let wrap = |source| CliError::Motif {
        motif: args.motif.clone(),
        source,
    };

    if args.multi_chain {
        let designed = motif
            .get_motif_wrt_designed_structure_multi_chain()
            .map(|result| result.map(|m| m.to_string()).map_err(wrap))
            .collect::<Result<Vec<_>>>()?;
        info!("Motif {} maps onto {} designed chains.", motif, designed.len());
        Ok(designed)
    } else {
        let designed = motif
            .get_motif_wrt_designed_structure(args.chain)
            .map_err(wrap)?;
        Ok(vec![designed.to_string()])
    }
}
