use ippi::{CollectStringPrint, Error, ExcKind, IppRun, NoInput, Opcode};

fn program(body: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><program language="IPPcode23">{body}</program>"#)
}

/// A program that fails to load.
fn load_err(body: &str) -> Error {
    IppRun::new(&program(body)).expect_err("program should be rejected at load time")
}

/// A program that loads but fails at run time.
fn run_err(body: &str) -> Error {
    let source = program(body);
    let runner = IppRun::new(&source).expect("program should load");
    let mut print = CollectStringPrint::new();
    runner
        .run(&mut NoInput, &mut print)
        .expect_err("program should fail at run time")
}

fn assert_kind(err: &Error, kind: ExcKind, exit_code: u8) {
    assert_eq!(err.kind(), kind, "{err}");
    assert_eq!(err.exit_code(), exit_code, "{err}");
}

#[test]
fn malformed_xml_is_31() {
    for source in ["", "not xml at all", "<program", "<program language=\"IPPcode23\">"] {
        let err = IppRun::new(source).expect_err("should be rejected");
        assert_kind(&err, ExcKind::XmlFormat, 31);
    }
}

#[test]
fn wrong_root_element_is_32() {
    let err = IppRun::new(r#"<prog language="IPPcode23"></prog>"#).expect_err("should be rejected");
    assert_kind(&err, ExcKind::XmlStructure, 32);
}

#[test]
fn bad_language_attribute_is_32() {
    let err = IppRun::new(r#"<program language="IPPcode99"></program>"#).expect_err("should be rejected");
    assert_kind(&err, ExcKind::XmlStructure, 32);
    let err = IppRun::new(r#"<program></program>"#).expect_err("should be rejected");
    assert_kind(&err, ExcKind::XmlStructure, 32);
}

#[test]
fn unknown_opcode_is_32() {
    let err = load_err(r#"<instruction order="1" opcode="FROBNICATE"></instruction>"#);
    assert_kind(&err, ExcKind::XmlStructure, 32);
}

#[test]
fn bad_literals_are_32() {
    for arg in [
        r#"<arg1 type="int">abc</arg1>"#,
        r#"<arg1 type="int">1.5</arg1>"#,
        r#"<arg1 type="int"></arg1>"#,
        r#"<arg1 type="bool">True</arg1>"#,
        r#"<arg1 type="nil">null</arg1>"#,
        r#"<arg1 type="string">bad\0escape</arg1>"#,
        r#"<arg1 type="string">trailing\</arg1>"#,
    ] {
        let err = load_err(&format!(r#"<instruction order="1" opcode="WRITE">{arg}</instruction>"#));
        assert_kind(&err, ExcKind::XmlStructure, 32);
    }
}

#[test]
fn bad_orders_are_32() {
    for (a, b) in [("1", "1"), ("0", "2"), ("-3", "2")] {
        let err = load_err(&format!(
            r#"<instruction order="{a}" opcode="BREAK"></instruction>
               <instruction order="{b}" opcode="BREAK"></instruction>"#
        ));
        assert_kind(&err, ExcKind::XmlStructure, 32);
    }
}

#[test]
fn argument_shape_faults_are_32() {
    for body in [
        // missing argument
        r#"<instruction order="1" opcode="MOVE"><arg1 type="var">GF@x</arg1></instruction>"#,
        // argument beyond the signature
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1><arg2 type="int">1</arg2></instruction>"#,
        // duplicate position
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1><arg1 type="var">GF@y</arg1></instruction>"#,
        // unexpected element name
        r#"<instruction order="1" opcode="DEFVAR"><operand type="var">GF@x</operand></instruction>"#,
        // label where a symbol is expected
        r#"<instruction order="1" opcode="WRITE"><arg1 type="label">l</arg1></instruction>"#,
        // literal where a variable is expected
        r#"<instruction order="1" opcode="MOVE"><arg1 type="int">1</arg1><arg2 type="int">2</arg2></instruction>"#,
        // variable where a label is expected
        r#"<instruction order="1" opcode="JUMP"><arg1 type="var">GF@x</arg1></instruction>"#,
        // string literal where a type is expected
        r#"<instruction order="1" opcode="READ"><arg1 type="var">GF@x</arg1><arg2 type="string">int</arg2></instruction>"#,
        // missing type attribute
        r#"<instruction order="1" opcode="WRITE"><arg1>1</arg1></instruction>"#,
    ] {
        let err = load_err(body);
        assert_kind(&err, ExcKind::XmlStructure, 32);
    }
}

#[test]
fn bad_variable_references_are_32() {
    for var in ["GFx", "XF@x", "GF@1x", "GF@", "gf@x"] {
        let err = load_err(&format!(
            r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">{var}</arg1></instruction>"#
        ));
        assert_kind(&err, ExcKind::XmlStructure, 32);
    }
}

#[test]
fn bad_type_name_is_32() {
    let err = load_err(
        r#"<instruction order="1" opcode="READ"><arg1 type="var">GF@x</arg1><arg2 type="type">float</arg2></instruction>"#,
    );
    assert_kind(&err, ExcKind::XmlStructure, 32);
}

#[test]
fn duplicate_label_is_52_at_load_time() {
    let err = load_err(
        r#"<instruction order="1" opcode="LABEL"><arg1 type="label">l</arg1></instruction>
           <instruction order="2" opcode="LABEL"><arg1 type="label">l</arg1></instruction>"#,
    );
    assert_kind(&err, ExcKind::Semantic, 52);
}

#[test]
fn redefined_variable_is_52() {
    let err = run_err(
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>"#,
    );
    assert_kind(&err, ExcKind::Semantic, 52);
}

#[test]
fn jump_to_unknown_label_is_52() {
    let err = run_err(r#"<instruction order="1" opcode="JUMP"><arg1 type="label">nowhere</arg1></instruction>"#);
    assert_kind(&err, ExcKind::Semantic, 52);
    let err = run_err(r#"<instruction order="1" opcode="CALL"><arg1 type="label">nowhere</arg1></instruction>"#);
    assert_kind(&err, ExcKind::Semantic, 52);
}

#[test]
fn untaken_conditional_jump_still_checks_its_label() {
    let err = run_err(
        r#"<instruction order="1" opcode="JUMPIFEQ"><arg1 type="label">nowhere</arg1><arg2 type="int">1</arg2><arg3 type="int">2</arg3></instruction>"#,
    );
    assert_kind(&err, ExcKind::Semantic, 52);
}

#[test]
fn operand_type_mismatches_are_53() {
    for body in [
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="ADD"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2><arg3 type="string">x</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="LT"><arg1 type="var">GF@r</arg1><arg2 type="nil">nil</arg2><arg3 type="int">1</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="EQ"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2><arg3 type="string">1</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="AND"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2><arg3 type="bool">true</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="NOT"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="CONCAT"><arg1 type="var">GF@r</arg1><arg2 type="string">a</arg2><arg3 type="int">1</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="STRLEN"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="GETCHAR"><arg1 type="var">GF@r</arg1><arg2 type="string">abc</arg2><arg3 type="string">0</arg3></instruction>"#,
        r#"<instruction order="1" opcode="EXIT"><arg1 type="string">0</arg1></instruction>"#,
    ] {
        let err = run_err(body);
        assert_kind(&err, ExcKind::OperandType, 53);
    }
}

#[test]
fn undefined_variable_is_54() {
    let err = run_err(r#"<instruction order="1" opcode="WRITE"><arg1 type="var">GF@missing</arg1></instruction>"#);
    assert_kind(&err, ExcKind::UndefVariable, 54);
    let err = run_err(
        r#"<instruction order="1" opcode="MOVE"><arg1 type="var">GF@missing</arg1><arg2 type="int">1</arg2></instruction>"#,
    );
    assert_kind(&err, ExcKind::UndefVariable, 54);
}

#[test]
fn absent_frames_are_55() {
    for body in [
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">LF@x</arg1></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">TF@x</arg1></instruction>"#,
        r#"<instruction order="1" opcode="PUSHFRAME"></instruction>"#,
        r#"<instruction order="1" opcode="POPFRAME"></instruction>"#,
    ] {
        let err = run_err(body);
        assert_kind(&err, ExcKind::FrameAbsent, 55);
    }
}

#[test]
fn missing_values_are_56() {
    for body in [
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="POPS"><arg1 type="var">GF@x</arg1></instruction>"#,
        r#"<instruction order="1" opcode="RETURN"></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="PUSHS"><arg1 type="var">GF@x</arg1></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@y</arg1></instruction>
           <instruction order="3" opcode="MOVE"><arg1 type="var">GF@y</arg1><arg2 type="var">GF@x</arg2></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="3" opcode="ADD"><arg1 type="var">GF@r</arg1><arg2 type="var">GF@x</arg2><arg3 type="int">1</arg3></instruction>"#,
    ] {
        let err = run_err(body);
        assert_kind(&err, ExcKind::MissingValue, 56);
    }
}

#[test]
fn bad_operand_values_are_57() {
    for body in [
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="IDIV"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2><arg3 type="int">0</arg3></instruction>"#,
        r#"<instruction order="1" opcode="EXIT"><arg1 type="int">50</arg1></instruction>"#,
        r#"<instruction order="1" opcode="EXIT"><arg1 type="int">-1</arg1></instruction>"#,
    ] {
        let err = run_err(body);
        assert_kind(&err, ExcKind::OperandValue, 57);
    }
}

#[test]
fn string_faults_are_58() {
    for body in [
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="GETCHAR"><arg1 type="var">GF@r</arg1><arg2 type="string">abc</arg2><arg3 type="int">3</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="GETCHAR"><arg1 type="var">GF@r</arg1><arg2 type="string">abc</arg2><arg3 type="int">-1</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="MOVE"><arg1 type="var">GF@r</arg1><arg2 type="string">abc</arg2></instruction>
           <instruction order="3" opcode="SETCHAR"><arg1 type="var">GF@r</arg1><arg2 type="int">0</arg2><arg3 type="string"></arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="MOVE"><arg1 type="var">GF@r</arg1><arg2 type="string">abc</arg2></instruction>
           <instruction order="3" opcode="SETCHAR"><arg1 type="var">GF@r</arg1><arg2 type="int">5</arg2><arg3 type="string">X</arg3></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="INT2CHAR"><arg1 type="var">GF@r</arg1><arg2 type="int">-1</arg2></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="INT2CHAR"><arg1 type="var">GF@r</arg1><arg2 type="int">55296</arg2></instruction>"#,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="STRI2INT"><arg1 type="var">GF@r</arg1><arg2 type="string">abc</arg2><arg3 type="int">99</arg3></instruction>"#,
    ] {
        let err = run_err(body);
        assert_kind(&err, ExcKind::StringError, 58);
    }
}

#[test]
fn diagnostics_name_the_failing_instruction() {
    let err = run_err(
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
           <instruction order="2" opcode="IDIV"><arg1 type="var">GF@r</arg1><arg2 type="int">1</arg2><arg3 type="int">0</arg3></instruction>"#,
    );
    assert_eq!(err.instruction(), Some((Opcode::IDiv, 2)));
    let rendered = err.to_string();
    assert!(rendered.contains("IDIV (order 2)"), "{rendered}");
    assert!(rendered.contains("division by zero"), "{rendered}");
}

#[test]
fn preprocessing_errors_abort_before_any_instruction_runs() {
    let source = program(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">side-effect</arg1></instruction>
           <instruction order="2" opcode="LABEL"><arg1 type="label">l</arg1></instruction>
           <instruction order="3" opcode="LABEL"><arg1 type="label">l</arg1></instruction>"#,
    );
    let err = IppRun::new(&source).expect_err("duplicate label should fail at load time");
    assert_kind(&err, ExcKind::Semantic, 52);
}
