use gfl_image::{
    elf::ElfImage,
    pipeline::{Pipeline, DEFAULT_STRIPE_SIZE},
    Image,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let path = std::env::args().nth(1).expect("usage: decrypt <libtprt.so>");
    let mut image = ElfImage::parse(std::fs::read(&path).unwrap()).unwrap();

    let mut pipeline = Pipeline::new(DEFAULT_STRIPE_SIZE);
    if pipeline.process_image(&mut image).unwrap() {
        let output = format!("{path}.decrypted");
        std::fs::write(&output, image.data()).unwrap();
        println!("decrypted {} image written to {output}", image.arch());
    } else {
        println!("nothing to decrypt in {path}");
    }
}
