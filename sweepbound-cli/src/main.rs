fn main() -> anyhow::Result<()> {
    sweepbound_cli::run()
}
