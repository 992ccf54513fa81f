// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Toolchain recipes: gcc/binutils style C, C++ and assembly steps plus
//! cargo invocations.
//!
//! ```text
//! objs(["a.c", "b.cpp", "c.S"])
//!   a.c   -> cc   -> build/a.<id>.o
//!   b.cpp -> cxx  -> build/b.<id>.o
//!   c.S   -> asm  -> build/c.<id>.o      (cc rule, AS + ASFLAGS)
//!
//! static_lib("foo")  -> ar     -> build/libfoo.a
//! shared_lib("foo")  -> shlink -> build/libfoo.so
//! c_exe / cxx_exe    -> link   (libs looked up in LIBPATH)
//! rust / rust_lib / rust_exe -> cargo (restat)
//! ```
//!
//! Every recipe registers its rule on first use. Each recipe computes the
//! lowercase variables of its rule (`ccflags`, `linkflags`, ...) from the
//! uppercase environment variables (`CFLAGS`, `LINKFLAGS`, ...).

use super::Env;
use super::types::BuildRequest;
use crate::error::{GraphError, GraphResult};
use crate::graph::Generator;
use crate::graph::rule::{DepsStyle, Rule, RuleFlags};
use crate::path::{BuildPath, NodePath, PathArg};

/// Definition of a builtin rule.
#[must_use]
pub fn builtin_rule(name: &str) -> Option<Rule> {
    let rule = match name {
        "install" => Rule::new("install $instflags $in $out && touch $out", "INSTALL $out"),
        "cpp" => compile_rule("$cpp -MD -MF $out.d -P $cppflags $in -o $out", "CPP $out"),
        "cc" => compile_rule("$cc -MD -MF $out.d $ccflags -c $in -o $out", "CC $out"),
        "cxx" => compile_rule("$cxx -MD -MF $out.d $cxxflags -c $in -o $out", "CXX $out"),
        "ar" => Rule::new("$ar rc $arflags $out $in && $ranlib $out", "AR $out"),
        "link" => Rule::new("$link -o $out $in $linkflags", "LINK $out"),
        "shlink" => Rule::new("$shlink -shared -o $out $in $shlinkflags", "SHLINK $out"),
        "strip" => Rule::new("$strip -o $out $in", "STRIP $out"),
        "cargo" => Rule::builder()
            .command("cd $dir && $env $cargo $cargoflags")
            .with_description("CARGO $out")
            .with_flags(RuleFlags::RESTAT)
            .build(),
        _ => return None,
    };
    Some(rule)
}

fn compile_rule(command: &str, description: &str) -> Rule {
    Rule::builder()
        .command(command)
        .with_description(description)
        .with_deps(DepsStyle::Gcc)
        .with_depfile("$out.d")
        .build()
}

/// Source kinds `objs` knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectKind {
    Asm,
    C,
    Cxx,
    Prebuilt,
}

impl ObjectKind {
    fn of(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit_once('.').map(|(_, ext)| ext)?;
        match ext {
            "S" | "s" => Some(Self::Asm),
            "c" => Some(Self::C),
            "cc" | "cpp" => Some(Self::Cxx),
            "o" | "a" | "so" => Some(Self::Prebuilt),
            _ => None,
        }
    }
}

impl Env {
    fn ensure_rule(generator: &mut Generator, name: &str) -> GraphResult<()> {
        match builtin_rule(name) {
            Some(rule) => generator.add_rule(name, rule),
            None => Err(GraphError::integrity(format!("no builtin rule '{name}'"))),
        }
    }

    fn joined(&self, names: &[&str]) -> String {
        names
            .iter()
            .flat_map(|name| self.tokens(name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn compile_flags(&self, names: &[&str]) -> GraphResult<String> {
        let mut flags: Vec<String> = names
            .iter()
            .flat_map(|name| self.tokens(name))
            .cloned()
            .collect();
        flags.extend(self.include_flags()?);
        Ok(flags.join(" "))
    }

    fn single(outputs: Vec<BuildPath>) -> GraphResult<BuildPath> {
        outputs
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::integrity("build step without outputs"))
    }

    /// Copies `input` into the directory `outdir`, keeping its file name.
    ///
    /// Source directories are mapped into the build tree.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] for unusable paths and
    /// [`GraphError::DuplicateOutput`] if the destination is already produced.
    #[track_caller]
    pub fn install(
        &self,
        generator: &mut Generator,
        outdir: impl Into<PathArg>,
        input: impl Into<PathArg>,
    ) -> GraphResult<BuildPath> {
        let input = self.context().resolve(input.into())?;
        let dir = self.build_location(outdir.into())?;
        let out = dir.join(input.file_name())?;
        self.install_as(generator, out, input)
    }

    /// Copies `input` to `out` using `INSTFLAGS`.
    ///
    /// # Errors
    ///
    /// See [`Env::build`].
    #[track_caller]
    pub fn install_as(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        input: impl Into<PathArg>,
    ) -> GraphResult<BuildPath> {
        Self::ensure_rule(generator, "install")?;
        let request = BuildRequest::new("install")
            .output(out)
            .input(input)
            .var("instflags", self.joined(&["INSTFLAGS"]));
        self.build(generator, request).and_then(Self::single)
    }

    /// Strips the symbols of `input` into `out` using `STRIP`.
    ///
    /// # Errors
    ///
    /// See [`Env::build`].
    #[track_caller]
    pub fn strip(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        input: impl Into<PathArg>,
    ) -> GraphResult<BuildPath> {
        Self::ensure_rule(generator, "strip")?;
        let request = BuildRequest::new("strip")
            .output(out)
            .input(input)
            .var("strip", self.joined(&["STRIP"]));
        self.build(generator, request).and_then(Self::single)
    }

    /// Runs the C preprocessor (`CPP`, `CPPFLAGS`, `CPPPATH`).
    ///
    /// # Errors
    ///
    /// See [`Env::build`].
    #[track_caller]
    pub fn cpp(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        input: impl Into<PathArg>,
    ) -> GraphResult<BuildPath> {
        Self::ensure_rule(generator, "cpp")?;
        let request = BuildRequest::new("cpp")
            .output(out)
            .input(input)
            .var("cpp", self.joined(&["CPP"]))
            .var("cppflags", self.compile_flags(&["CPPFLAGS"])?);
        self.build(generator, request).and_then(Self::single)
    }

    /// Compiles C sources (`CC`, `CFLAGS`, `CPPFLAGS`, `CPPPATH`).
    ///
    /// # Errors
    ///
    /// See [`Env::build`].
    #[track_caller]
    pub fn cc<I, P>(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        ins: I,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        let flags = self.compile_flags(&["CFLAGS", "CPPFLAGS"])?;
        self.cc_step(generator, out.into(), ins, "CC", flags)
    }

    /// Assembles sources with the C compiler driver (`AS`, `ASFLAGS`,
    /// `CPPFLAGS`, `CPPPATH`).
    ///
    /// # Errors
    ///
    /// See [`Env::build`].
    #[track_caller]
    pub fn asm<I, P>(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        ins: I,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        let flags = self.compile_flags(&["ASFLAGS", "CPPFLAGS"])?;
        self.cc_step(generator, out.into(), ins, "AS", flags)
    }

    #[track_caller]
    fn cc_step<I, P>(
        &self,
        generator: &mut Generator,
        out: PathArg,
        ins: I,
        tool: &str,
        flags: String,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        Self::ensure_rule(generator, "cc")?;
        let request = BuildRequest::new("cc")
            .output(out)
            .inputs(ins)
            .var("cc", self.joined(&[tool]))
            .var("ccflags", flags);
        self.build(generator, request).and_then(Self::single)
    }

    /// Compiles C++ sources (`CXX`, `CXXFLAGS`, `CPPFLAGS`, `CPPPATH`).
    ///
    /// # Errors
    ///
    /// See [`Env::build`].
    #[track_caller]
    pub fn cxx<I, P>(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        ins: I,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        Self::ensure_rule(generator, "cxx")?;
        let request = BuildRequest::new("cxx")
            .output(out)
            .inputs(ins)
            .var("cxx", self.joined(&["CXX"]))
            .var("cxxflags", self.compile_flags(&["CXXFLAGS", "CPPFLAGS"])?);
        self.build(generator, request).and_then(Self::single)
    }

    /// Builds one object file per source, dispatching on the extension.
    ///
    /// Objects are named `<stem>.<env id>.o` in the build tree, so different
    /// environments can compile the same source. `.o`, `.a` and `.so`
    /// inputs are passed through.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::GraphIntegrity`] for inputs of unknown type,
    /// otherwise see [`Env::build`].
    #[track_caller]
    pub fn objs<I, P>(&self, generator: &mut Generator, ins: I) -> GraphResult<Vec<BuildPath>>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        let suffix = format!("{}.o", self.id());
        let mut objs = Vec::new();
        for input in ins {
            let input = self.context().resolve(input.into())?;
            let Some(kind) = ObjectKind::of(input.file_name()) else {
                return Err(GraphError::integrity(format!(
                    "cannot build an object file from '{input}'"
                )));
            };
            let obj = match kind {
                ObjectKind::Prebuilt => self.context().output(input.into())?,
                kind => {
                    let out = self
                        .context()
                        .output(PathArg::from(&input))?
                        .with_extension(&suffix);
                    match kind {
                        ObjectKind::Asm => self.asm(generator, out, [input])?,
                        ObjectKind::C => self.cc(generator, out, [input])?,
                        _ => self.cxx(generator, out, [input])?,
                    }
                }
            };
            objs.push(obj);
        }
        Ok(objs)
    }

    /// Archives the objects of `ins` into `lib<name>.a` (`AR`, `RANLIB`,
    /// `ARFLAGS`).
    ///
    /// # Errors
    ///
    /// See [`Env::objs`].
    #[track_caller]
    pub fn static_lib<I, P>(
        &self,
        generator: &mut Generator,
        name: &str,
        ins: I,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        let objs = self.objs(generator, ins)?;
        Self::ensure_rule(generator, "ar")?;
        let request = BuildRequest::new("ar")
            .output(format!("lib{name}.a"))
            .inputs(objs)
            .var("ar", self.joined(&["AR"]))
            .var("ranlib", self.joined(&["RANLIB"]))
            .var("arflags", self.joined(&["ARFLAGS"]));
        self.build(generator, request).and_then(Self::single)
    }

    /// Links the objects of `ins` into `lib<name>.so` (`SHLINK`,
    /// `SHLINKFLAGS`).
    ///
    /// # Errors
    ///
    /// See [`Env::objs`].
    #[track_caller]
    pub fn shared_lib<I, P>(
        &self,
        generator: &mut Generator,
        name: &str,
        ins: I,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        let objs = self.objs(generator, ins)?;
        Self::ensure_rule(generator, "shlink")?;
        let request = BuildRequest::new("shlink")
            .output(format!("lib{name}.so"))
            .inputs(objs)
            .var("shlink", self.joined(&["SHLINK"]))
            .var("shlinkflags", self.joined(&["SHLINKFLAGS"]));
        self.build(generator, request).and_then(Self::single)
    }

    /// Links a C executable with `CC` as the linker driver.
    ///
    /// `libs` are linked with `-l` from the `LIBPATH` directories; libraries
    /// this graph builds there become implicit inputs. `deps` are extra
    /// implicit dependencies.
    ///
    /// # Errors
    ///
    /// See [`Env::objs`].
    #[track_caller]
    pub fn c_exe<I, P>(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        ins: I,
        libs: &[&str],
        deps: &[PathArg],
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        self.link_exe(generator, out.into(), ins, libs, deps, "CC")
    }

    /// Links a C++ executable with `CXX` as the linker driver.
    ///
    /// # Errors
    ///
    /// See [`Env::c_exe`].
    #[track_caller]
    pub fn cxx_exe<I, P>(
        &self,
        generator: &mut Generator,
        out: impl Into<PathArg>,
        ins: I,
        libs: &[&str],
        deps: &[PathArg],
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        self.link_exe(generator, out.into(), ins, libs, deps, "CXX")
    }

    #[track_caller]
    fn link_exe<I, P>(
        &self,
        generator: &mut Generator,
        out: PathArg,
        ins: I,
        libs: &[&str],
        deps: &[PathArg],
        linker: &str,
    ) -> GraphResult<BuildPath>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        let objs = self.objs(generator, ins)?;
        Self::ensure_rule(generator, "link")?;

        let mut flags: Vec<String> = self.tokens("LINKFLAGS").to_vec();
        if !libs.is_empty() {
            flags.extend(self.lib_dirs()?.iter().map(|dir| format!("-L{dir}")));
            flags.push("-Wl,--start-group".to_string());
            flags.extend(libs.iter().map(|lib| format!("-l{lib}")));
            flags.push("-Wl,--end-group".to_string());
        }

        let request = BuildRequest::new("link")
            .output(out)
            .inputs(objs)
            .implicits(deps.iter().cloned())
            .libs(libs.iter().copied())
            .var("link", self.joined(&[linker]))
            .var("linkflags", flags.join(" "));
        self.build(generator, request).and_then(Self::single)
    }

    /// Builds the static library `lib<name>.a` with cargo.
    ///
    /// # Errors
    ///
    /// See [`Env::rust`].
    #[track_caller]
    pub fn rust_lib(
        &self,
        generator: &mut Generator,
        name: &str,
        deps: &[PathArg],
    ) -> GraphResult<BuildPath> {
        let outputs = self.rust(generator, &[&format!("lib{name}.a")], deps)?;
        Self::single(outputs)
    }

    /// Builds the executable `name` with cargo.
    ///
    /// # Errors
    ///
    /// See [`Env::rust`].
    #[track_caller]
    pub fn rust_exe(
        &self,
        generator: &mut Generator,
        name: &str,
        deps: &[PathArg],
    ) -> GraphResult<BuildPath> {
        let outputs = self.rust(generator, &[name], deps)?;
        Self::single(outputs)
    }

    /// Runs `cargo build` in the current directory for one or more outputs.
    ///
    /// The target directory is `<build root>/<RUSTBINS>`; the outputs land in
    /// its `[<target>/](debug|release)` subdirectory as selected by
    /// `--target` and `--release` in `CRGFLAGS`. `CRGENV` holds `KEY=VALUE`
    /// tokens passed to cargo's environment. Without `deps` the step always
    /// runs and cargo decides what to rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] for an unusable `RUSTBINS` or
    /// output name, otherwise see [`Env::build`].
    #[track_caller]
    pub fn rust(
        &self,
        generator: &mut Generator,
        outs: &[&str],
        deps: &[PathArg],
    ) -> GraphResult<Vec<BuildPath>> {
        let crg_flags = self.tokens("CRGFLAGS");
        let target = crg_flags
            .iter()
            .position(|flag| flag == "--target")
            .and_then(|idx| crg_flags.get(idx + 1))
            .map(|triple| format!("{triple}/"))
            .unwrap_or_default();
        let profile = if crg_flags.iter().any(|flag| flag == "--release") {
            "release"
        } else {
            "debug"
        };

        let bins = self.tokens("RUSTBINS").first().map_or(".", String::as_str);
        let target_dir = match bins.trim_matches('/') {
            "" | "." => self.build_root(),
            dir => self.build_root().join(dir)?,
        };
        let dest = target_dir.join(&format!("{target}{profile}"))?;
        let outputs = outs
            .iter()
            .map(|out| dest.join(out))
            .collect::<GraphResult<Vec<_>>>()?;

        let target_abs = self.context().absolute(&NodePath::Build(target_dir));
        let mut cargo_flags = vec!["build".to_string()];
        cargo_flags.extend(crg_flags.iter().cloned());
        cargo_flags.push(format!("--target-dir \"{}\"", target_abs.display()));

        let env = self
            .tokens("CRGENV")
            .iter()
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => format!("{key}=\"{value}\""),
                None => pair.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self::ensure_rule(generator, "cargo")?;
        let request = BuildRequest::new("cargo")
            .outputs(outputs)
            .implicits(deps.iter().cloned())
            .var("cargo", self.joined(&["CARGO"]))
            .var("dir", self.cur_dir().to_string())
            .var("cargoflags", cargo_flags.join(" "))
            .var("env", env);
        self.build(generator, request)
    }

    /// A directory given by the user, mapped into the build tree.
    pub(super) fn build_location(&self, dir: PathArg) -> GraphResult<BuildPath> {
        match self.context().resolve(dir)? {
            NodePath::Build(path) => Ok(path),
            NodePath::Source(path) => Ok(self.context().to_build(&path)),
        }
    }
}
