fn main() {
    twenty48::run();
}
