use gfl_stc::{export::ExportOptions, export_stc_formats, model::TypeModel};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut args = std::env::args().skip(1);
    let model_path = args.next().expect("usage: export <model.json> [output-root]");
    let model: TypeModel =
        serde_json::from_reader(std::fs::File::open(model_path).unwrap()).unwrap();

    let mut options = ExportOptions::default();
    if let Some(path) = args.next() {
        options.path = path.into();
    }

    let arch = model.arch().to_string();
    if export_stc_formats(&model, Some(&arch), &options).unwrap() {
        println!("format files written to {}", options.path.display());
    }
}
