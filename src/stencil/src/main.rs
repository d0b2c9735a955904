fn main() -> anyhow::Result<()> {
    stencil_cli::main()
}
