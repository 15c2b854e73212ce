fn main() -> eframe::Result {
    mask_maker_app::run_native()
}
