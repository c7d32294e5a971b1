fn main() -> anyhow::Result<()> {
    httpbridge::cli::run_cli()
}
