fn main() {
    if let Err(err) = boxgraph_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
