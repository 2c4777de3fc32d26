use crate::{driver::optimize, options::Options};
use ast::{Program, ProgramData};

fn parse(src: &str, program_data: &mut ProgramData) -> Program {
    match parser::parse_program(src, program_data) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse {:?}: {:?}", src, err),
    }
}

fn print(program: &Program) -> String {
    codegen::print_program(program, Default::default())
}

/// Optimizes `input` and compares it to `expected`, after running both
/// through the printer so that formatting doesn't matter.
pub fn test_transform(options: Options, input: &str, expected: &str) {
    ::testing::init_logger();

    let mut program_data = ProgramData::default();
    let mut program = parse(input, &mut program_data);
    optimize(&mut program, &mut program_data, &options);
    let actual_src = print(&program);

    let mut expected_data = ProgramData::default();
    let expected_src = print(&parse(expected, &mut expected_data));

    if actual_src == expected_src {
        return;
    }

    println!(">>>>> Input <<<<<\n{}", input);
    println!(">>>>> Output <<<<<\n{}", actual_src);
    println!(">>>>> Expected <<<<<\n{}", expected_src);
    panic!(
        r#"assertion failed: `(left == right)`
            {}"#,
        ::testing::diff(&actual_src, &expected_src),
    );
}
