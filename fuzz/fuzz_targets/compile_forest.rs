#![no_main]

use golly::{CompileOptions, Compiler, OutputMode};
use golly_syntax::TypedForest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    // Arbitrary forests must never panic the pipeline, only fail it.
    if let Ok(forest) = TypedForest::from_json(json) {
        let paths: Vec<String> = forest.packages.iter().map(|p| p.path.clone()).collect();
        let _ = Compiler::new(forest.clone()).compile(&paths);
        let _ = Compiler::new(forest)
            .with_options(CompileOptions::default().with_mode(OutputMode::PerPackage))
            .compile(&paths);
    }
});
