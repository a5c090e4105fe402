//! Static file contents written into new projects.

use serde_json::{json, Value};

/// Initial contents of the script entry point.
pub const DEFAULT_SCRIPT: &str = r"/*
 _____________________
< do things u want... >
---------------------
      \   ^__^
       \  (oo)_______
          (__)\       )\/\
              ||----w |
              ||     ||
*/";

/// Contents of `.mcattributes`.
pub const MCATTRIBUTES: &str = "diagnostic.disable.minecraft.manifest.module.missing=true";

/// `tsconfig.json` for TypeScript projects.
#[must_use]
pub fn tsconfig() -> Value {
    json!({
        "compilerOptions": {
            "target": "es2020",
            "moduleResolution": "node",
            "module": "es2020",
            "noLib": false,
            "emitDecoratorMetadata": true,
            "experimentalDecorators": true,
            "pretty": true,
            "allowUnreachableCode": true,
            "allowUnusedLabels": true,
            "noImplicitAny": true,
            "rootDir": ".",
            "listFiles": false,
            "noEmitHelpers": true
        },
        "include": ["scripts/**/*"],
        "compileOnSave": false
    })
}
