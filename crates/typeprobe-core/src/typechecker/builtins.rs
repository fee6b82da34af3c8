//! Ambient declarations every program is checked against.

/// Name the library file is reported under
pub const LIB_FILE_NAME: &str = "lib.typeprobe.d.ts";

/// First node id handed to the library parse, far above any program's ids
pub const LIB_FIRST_NODE_ID: u32 = 0x8000_0000;

pub const LIB_SOURCE: &str = r#"
interface Array<T> {
    length: number;
    [index: number]: T;
    push(...items: T[]): number;
    pop(): T | undefined;
    shift(): T | undefined;
    unshift(...items: T[]): number;
    join(separator?: string): string;
    reverse(): T[];
    slice(start?: number, end?: number): T[];
    concat(...items: T[][]): T[];
    indexOf(searchElement: T, fromIndex?: number): number;
    includes(searchElement: T, fromIndex?: number): boolean;
    map<U>(callbackfn: (value: T, index: number, array: T[]) => U): U[];
    filter(predicate: (value: T, index: number, array: T[]) => unknown): T[];
    forEach(callbackfn: (value: T, index: number, array: T[]) => void): void;
    find(predicate: (value: T, index: number, array: T[]) => unknown): T | undefined;
    findIndex(predicate: (value: T, index: number, array: T[]) => unknown): number;
    some(predicate: (value: T, index: number, array: T[]) => unknown): boolean;
    every(predicate: (value: T, index: number, array: T[]) => unknown): boolean;
    reduce<U>(callbackfn: (previousValue: U, currentValue: T, currentIndex: number) => U, initialValue: U): U;
    sort(compareFn?: (a: T, b: T) => number): T[];
}

interface ReadonlyArray<T> {
    readonly length: number;
    [index: number]: T;
    join(separator?: string): string;
    slice(start?: number, end?: number): T[];
    concat(...items: T[][]): T[];
    indexOf(searchElement: T, fromIndex?: number): number;
    includes(searchElement: T, fromIndex?: number): boolean;
    map<U>(callbackfn: (value: T, index: number) => U): U[];
    filter(predicate: (value: T, index: number) => unknown): T[];
    forEach(callbackfn: (value: T, index: number) => void): void;
    find(predicate: (value: T, index: number) => unknown): T | undefined;
    some(predicate: (value: T, index: number) => unknown): boolean;
    every(predicate: (value: T, index: number) => unknown): boolean;
}

interface String {
    readonly length: number;
    charAt(pos: number): string;
    charCodeAt(index: number): number;
    indexOf(searchString: string, position?: number): number;
    includes(searchString: string, position?: number): boolean;
    startsWith(searchString: string, position?: number): boolean;
    endsWith(searchString: string, endPosition?: number): boolean;
    slice(start?: number, end?: number): string;
    substring(start: number, end?: number): string;
    split(separator: string, limit?: number): string[];
    trim(): string;
    toUpperCase(): string;
    toLowerCase(): string;
    replace(searchValue: string, replaceValue: string): string;
    repeat(count: number): string;
    padStart(maxLength: number, fillString?: string): string;
    padEnd(maxLength: number, fillString?: string): string;
}

interface Number {
    toFixed(fractionDigits?: number): string;
    toPrecision(precision?: number): string;
    toString(radix?: number): string;
}

interface Boolean {
    valueOf(): boolean;
}

interface Console {
    log(...data: any[]): void;
    error(...data: any[]): void;
    warn(...data: any[]): void;
    info(...data: any[]): void;
}

interface Math {
    readonly PI: number;
    abs(x: number): number;
    ceil(x: number): number;
    floor(x: number): number;
    round(x: number): number;
    max(...values: number[]): number;
    min(...values: number[]): number;
    pow(x: number, y: number): number;
    random(): number;
    sqrt(x: number): number;
}

interface JSON {
    parse(text: string): any;
    stringify(value: any): string;
}

declare class Error {
    name: string;
    message: string;
    stack?: string;
    constructor(message?: string);
}

declare class Map<K, V> {
    readonly size: number;
    constructor();
    get(key: K): V | undefined;
    set(key: K, value: V): Map<K, V>;
    has(key: K): boolean;
    delete(key: K): boolean;
    clear(): void;
    forEach(callbackfn: (value: V, key: K) => void): void;
}

declare class Set<T> {
    readonly size: number;
    constructor(values?: T[]);
    add(value: T): Set<T>;
    has(value: T): boolean;
    delete(value: T): boolean;
    clear(): void;
    forEach(callbackfn: (value: T) => void): void;
}

declare const console: Console;
declare const Math: Math;
declare const JSON: JSON;
declare const NaN: number;
declare const Infinity: number;

declare function parseInt(string: string, radix?: number): number;
declare function parseFloat(string: string): number;
declare function isNaN(number: number): boolean;
declare function String(value?: any): string;
declare function Number(value?: any): number;
declare function Boolean(value?: any): boolean;
"#;
