//! Test fixtures - probe scripts and configs

/// Every assertion in this probe holds
pub fn passing_probe() -> &'static str {
    r#"const name = "typeprobe";
let count = 1;
const pair = [1, "a"] as const;

interface Point {
    x: number;
    y: number;
}

function origin(): Point {
    return { x: 0, y: 0 };
}

expectType<typeof name>().toBeStringLiteral();
expectType<typeof count>().toBeNumber();
expectType<typeof pair>().toBeTuple();
expectType(origin()).toBe<Point>();
expectType<string | number>().toBeUnion();
expectType<"a">().toExtends<string>();
expectType<string>().not.toBeNumber();
"#
}

/// Two failing assertions, on lines 2 and 3
pub fn failing_probe() -> &'static str {
    r#"const value = 1;
expectType<typeof value>().toBe<string>();
expectType<string>().not.toBeString();
"#
}

/// `expectType` without a received type, on line 1
pub fn missing_type_probe() -> &'static str {
    "expectType();\n"
}

/// Probe importing a helper module with a relative specifier
pub fn importing_probe() -> &'static str {
    r#"import { double } from "./lib/math";

expectType(double(2)).toBeNumber();
expectType<typeof double>().toBeFunction();
"#
}

pub fn math_module() -> &'static str {
    "export function double(value: number): number {\n    return value * 2;\n}\n"
}

/// Config including every probe under `probes/`
pub fn project_config() -> &'static str {
    r#"{
    "compilerOptions": { "strict": true },
    "include": ["probes/**/*.ts"]
}
"#
}

pub fn yaml_project_config() -> &'static str {
    "compilerOptions:\n  strict: true\ninclude:\n  - probes/**/*.ts\n"
}

/// A config naming an option the checker does not know
pub fn unknown_option_config() -> &'static str {
    r#"{ "compilerOptions": { "strictish": true }, "include": ["probes"] }"#
}
