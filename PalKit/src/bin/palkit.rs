fn main() -> anyhow::Result<()> {
    palkit::cli::run_cli()
}
