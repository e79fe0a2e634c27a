fn main() {
    // Askama reads email templates at compile time.
    println!("cargo:rerun-if-changed=templates");
}
