extern crate structopt;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use structopt::StructOpt;

use funshade::code::{code_gen, ProgCode};
use funshade::lang::Module;
use funshade::load::load;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "funshade",
    about = "Compiles functional shader descriptions into vertex/fragment GLSL programs."
)]
enum App {
    #[structopt(about = "Checks that a shader source file is correct")]
    Lint {
        #[structopt(long, parse(from_os_str), default_value = "./shaders.fs")]
        source_file: PathBuf,
        #[structopt(long)]
        no_color: bool,
    },
    #[structopt(about = "Generates vertex and fragment code for each program")]
    Gen {
        #[structopt(long, parse(from_os_str), default_value = "./shaders.fs")]
        source_file: PathBuf,
        /// Directory receiving `<program>.vert` and `<program>.frag`; stdout if omitted
        #[structopt(long, parse(from_os_str))]
        out_dir: Option<PathBuf>,
        /// Only generate the named program
        #[structopt(long)]
        program: Option<String>,
        #[structopt(long)]
        no_color: bool,
    },
}

fn gen_programs(
    module: &Module,
    out_dir: Option<&Path>,
    program: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let programs = code_gen(module, program)?;

    if let (Some(program), true) = (program, programs.is_empty()) {
        return Err(format!("no program named `{}`", program).into());
    }

    for (name, ProgCode { vertex, fragment }) in programs {
        match out_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                fs::write(dir.join(format!("{}.vert", name)), vertex)?;
                fs::write(dir.join(format!("{}.frag", name)), fragment)?;
            }
            None => {
                print!("// {}.vert\n{}", name, vertex);
                print!("// {}.frag\n{}", name, fragment);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let app = App::from_args();

    match app {
        App::Lint {
            source_file,
            no_color,
        } => match load(&source_file, !no_color) {
            Ok(module) => {
                println!(
                    "{}: {} programs",
                    source_file.display(),
                    module.programs.len()
                );
            }
            Err(e) => {
                eprintln!("{}", e);
                exit(1)
            }
        },

        App::Gen {
            source_file,
            out_dir,
            program,
            no_color,
        } => {
            match load(&source_file, !no_color)
                .and_then(|module| gen_programs(&module, out_dir.as_deref(), program.as_deref()))
            {
                Ok(()) => {}
                Err(e) => {
                    eprintln!("{}", e);
                    exit(1)
                }
            }
        }
    }
}
