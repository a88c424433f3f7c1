fn main() {
    image_input_lib::run()
}
