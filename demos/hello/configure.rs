// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration program of a small C project.
//!
//! ```text
//! cd demos/hello
//! cargo run --example hello -- --log-level 4
//! ninja -f build/build.ninja
//! ```

use ninjapie::cmd::configure::run;
use std::process::ExitCode;

fn main() -> ExitCode {
    run(|generator, env| {
        env.add_flags("CFLAGS", ["-O2", "-Wall"]);

        env.sub_build(generator, "greet", |generator, env| {
            let sources = env.glob(generator, "*.c")?;
            env.static_lib(generator, "greet", sources)
        })?;

        // relative to the current directory, so set after leaving greet/
        env.append("CPPPATH", ["greet"]);
        env.append("LIBPATH", ["greet"]);

        let hello = env.c_exe(generator, "hello", ["hello.c"], &["greet"], &[])?;

        let mut debug = env.clone();
        debug.set("CFLAGS", ["-O0", "-g"]);
        debug.c_exe(generator, "hello-debug", ["hello.c"], &["greet"], &[])?;

        env.strip(generator, "hello-stripped", hello)?;
        Ok(())
    })
}
