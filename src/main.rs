// The binary only points at the library and the demo.
// Run the XOR demo with:
//   cargo run --example xor
fn main() {
    println!("ferrite-mlp: a small multilayer perceptron engine in Rust.");
    println!("Run `cargo run --example xor` to train the XOR demo.");
}
