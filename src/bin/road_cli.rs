#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("road_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use road_mesh_engine::geom::{GeomMesh, GeomMeshDiagnostics, Point3};
    use road_mesh_engine::road::{ControlPointChain, RoadSettings, generate_road};
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"road_cli (road-mesh-engine)

USAGE:
  road_cli list
  road_cli run <scenario|all> [options]

SCENARIOS:
  square_loop
  figure_eight
  s_curve
  hairpin
  straight

OPTIONS (run):
  --out-dir <dir>        Write <scenario>.obj to this dir (required for `all`)
  --obj <path>           Write OBJ (single scenario only)
  --settings <json>      Road settings as JSON text, or @<path> to read a file
  --overwrite            Overwrite existing output files
  -h, --help             Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{:<14} {}", scenario.name(), scenario.description());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut settings = RoadSettings::default();
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--settings" => settings = parse_settings(&args.value("--settings")?)?,
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() {
                return Err("use either --out-dir or --obj (not both)".to_string());
            }
            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, &settings, dir, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_str(scenario_name.as_str())
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, &settings, dir, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario =
            Scenario::from_str(scenario_name.as_str()).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario, &settings);
        print!("{}", output.diagnostics);

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        settings: &RoadSettings,
        dir: &Path,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario, settings);
        let path = dir.join(format!("{}.obj", output.name));
        write_obj_file(&path, &output.mesh, output.name, overwrite)?;
        eprintln!("wrote {}", path.display());
        report(&output);
        Ok(())
    }

    fn report(output: &ScenarioOutput) {
        eprintln!(
            "{}: vertices={} triangles={} | {}",
            output.name,
            output.mesh.vertex_count(),
            output.mesh.triangle_count(),
            output.diagnostics.summary()
        );
    }

    fn parse_settings(value: &str) -> Result<RoadSettings, String> {
        let json = match value.strip_prefix('@') {
            Some(path) => fs::read_to_string(path).map_err(|e| format!("read settings {path}: {e}"))?,
            None => value.to_string(),
        };
        let settings = RoadSettings::from_json(&json).map_err(|e| format!("parse settings: {e}"))?;
        settings.validate().map_err(|e| format!("invalid settings: {e}"))?;
        Ok(settings)
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            msg.push_str("  ");
            msg.push_str(scenario.name());
            msg.push('\n');
        }
        msg
    }

    fn write_obj_file(path: &Path, mesh: &GeomMesh, name: &str, overwrite: bool) -> Result<(), String> {
        mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;

        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# road-mesh-engine road_cli").map_err(|e| format!("write obj: {e}"))?;
        writeln!(w, "o {name}").map_err(|e| format!("write obj: {e}"))?;

        for p in mesh.positions.iter().copied() {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(|e| format!("write obj: {e}"))?;
        }

        if let Some(uvs) = mesh.uvs.as_ref() {
            for uv in uvs.iter().copied() {
                writeln!(w, "vt {} {}", uv[0], uv[1]).map_err(|e| format!("write obj: {e}"))?;
            }
        }

        if let Some(normals) = mesh.normals.as_ref() {
            for n in normals.iter().copied() {
                writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(|e| format!("write obj: {e}"))?;
            }
        }

        let has_uvs = mesh.uvs.is_some();
        let has_normals = mesh.normals.is_some();

        for tri in mesh.indices.chunks_exact(3) {
            let a = tri[0] + 1;
            let b = tri[1] + 1;
            let c = tri[2] + 1;

            match (has_uvs, has_normals) {
                (true, true) => writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}"),
                (true, false) => writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}"),
                (false, true) => writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}"),
                (false, false) => writeln!(w, "f {a} {b} {c}"),
            }
            .map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    #[derive(Debug, Clone, Copy)]
    enum Scenario {
        SquareLoop,
        FigureEight,
        SCurve,
        Hairpin,
        Straight,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::SquareLoop,
            Scenario::FigureEight,
            Scenario::SCurve,
            Scenario::Hairpin,
            Scenario::Straight,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::SquareLoop => "square_loop",
                Scenario::FigureEight => "figure_eight",
                Scenario::SCurve => "s_curve",
                Scenario::Hairpin => "hairpin",
                Scenario::Straight => "straight",
            }
        }

        fn description(self) -> &'static str {
            match self {
                Scenario::SquareLoop => "closed loop through four corners of a 10x10 square",
                Scenario::FigureEight => "closed figure eight with the crossing raised as an overpass",
                Scenario::SCurve => "open S bend",
                Scenario::Hairpin => "open 180 degree turn",
                Scenario::Straight => "open straight road, 20 units",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            let name = name.replace('-', "_");
            Scenario::ALL.iter().copied().find(|s| s.name() == name)
        }

        fn chain(self) -> ControlPointChain {
            let p = Point3::new;
            match self {
                Scenario::SquareLoop => ControlPointChain::from_positions(
                    vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 0.0, 10.0), p(0.0, 0.0, 10.0)],
                    true,
                ),
                Scenario::FigureEight => ControlPointChain::from_positions(
                    vec![
                        p(0.0, 0.0, 0.0),
                        p(10.0, 0.0, 5.0),
                        p(20.0, 0.0, 0.0),
                        p(10.0, 0.0, -5.0),
                        p(0.0, 3.0, 0.0),
                        p(-10.0, 0.0, 5.0),
                        p(-20.0, 0.0, 0.0),
                        p(-10.0, 0.0, -5.0),
                    ],
                    true,
                ),
                Scenario::SCurve => ControlPointChain::from_positions(
                    vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 6.0), p(20.0, 0.0, -6.0), p(30.0, 0.0, 0.0)],
                    false,
                ),
                Scenario::Hairpin => ControlPointChain::from_positions(
                    vec![
                        p(0.0, 0.0, 0.0),
                        p(20.0, 0.0, 0.0),
                        p(23.0, 0.0, 4.0),
                        p(20.0, 0.0, 8.0),
                        p(0.0, 0.0, 8.0),
                    ],
                    false,
                ),
                Scenario::Straight => {
                    ControlPointChain::from_positions(vec![p(0.0, 0.0, 0.0), p(20.0, 0.0, 0.0)], false)
                }
            }
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        mesh: GeomMesh,
        diagnostics: GeomMeshDiagnostics,
    }

    fn run_scenario(scenario: Scenario, settings: &RoadSettings) -> ScenarioOutput {
        let (mesh, diagnostics) = generate_road(&[scenario.chain()], settings);
        ScenarioOutput {
            name: scenario.name(),
            mesh,
            diagnostics,
        }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
