#[actix_web::main]
async fn main() {
    if let Err(err) = testcase_llm::run().await {
        eprintln!("testcase-llm: {}", err);
        std::process::exit(1);
    }
}
