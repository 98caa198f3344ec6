fn main() -> anyhow::Result<()> {
    microbench::commands::main()
}
