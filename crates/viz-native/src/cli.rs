use clap::Parser;
use viz_core::LayerKind;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Layer shown at startup (bubbles, waves, plasma, trees, solar, water)
    #[arg(long, default_value = "bubbles")]
    pub layer: LayerKind,

    /// MIDI input port: index or part of the port name. Defaults to the first port.
    #[arg(long)]
    pub midi_port: Option<String>,

    /// Print available MIDI input ports and exit
    #[arg(long, default_value_t = false)]
    pub list_midi: bool,

    /// Run with the computer keyboard only
    #[arg(long, default_value_t = false)]
    pub no_midi: bool,

    /// Seed for the layers' random spawn jitter
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layer_and_seed() {
        let args = Args::parse_from(["viz", "--layer", "solar", "--seed", "9", "--no-midi"]);
        assert_eq!(args.layer, LayerKind::Solar);
        assert_eq!(args.seed, Some(9));
        assert!(args.no_midi);
        assert!(args.midi_port.is_none());
    }

    #[test]
    fn rejects_unknown_layer() {
        assert!(Args::try_parse_from(["viz", "--layer", "fire"]).is_err());
    }

    #[test]
    fn defaults_to_bubbles() {
        let args = Args::parse_from(["viz"]);
        assert_eq!(args.layer, LayerKind::Bubbles);
        assert!(!args.list_midi);
    }
}
