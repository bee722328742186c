// tests/common/mod.rs
//! Shared program fixtures for the reachability integration tests.

#![allow(dead_code)]

use reach::{ReachGraph, ReachOptions};
use reach_ast::{
    Body, BodyBuilder, Capability, Literal, Program, ProgramBuilder, TypeDefId,
    TypeDefKind, TypeRef,
};
use tracing_subscriber::EnvFilter;

/// Install a subscriber if `REACH_LOG` is set, e.g. `REACH_LOG=reach=trace`.
pub fn init_tracing() {
    if let Ok(filter) = EnvFilter::try_from_env("REACH_LOG") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

/// A checked program plus the entry point the driver would use.
pub struct Fixture {
    pub program: Program,
    pub main: TypeRef,
}

impl Fixture {
    /// Reach `Main.create` and finalize with debug options.
    pub fn run(&self) -> ReachGraph {
        init_tracing();
        let options = ReachOptions::debug();
        let mut graph = ReachGraph::new();
        graph
            .reach(&self.program, &self.main, "create", &[], &options)
            .unwrap();
        graph.finalize(&options).unwrap();
        graph
    }

    pub fn def(&self, name: &str) -> TypeDefId {
        self.program.type_def_by_name(name).unwrap().id
    }
}

pub fn empty_body() -> Body {
    BodyBuilder::new().finish_seq(Vec::new())
}

/// Declare `be greet` with an empty body on `def`.
fn add_greet(b: &mut ProgramBuilder, def: TypeDefId) {
    let m = b.be("greet").body(empty_body());
    b.add_method(def, m);
}

fn add_create(b: &mut ProgramBuilder, def: TypeDefId, cap: Capability) {
    let m = b.constructor("create", cap).body(empty_body());
    b.add_method(def, m);
}

/// ```text
/// trait Greeter
///   be greet()
/// actor A is Greeter ...
/// actor B is Greeter ...
/// actor Main
///   new create() =>
///     let g: Greeter tag = A.create()
///     B.create()
///     g.greet()
/// ```
pub fn greeter_scenario() -> Fixture {
    let mut b = ProgramBuilder::new();
    let greeter = b.type_def("Greeter", TypeDefKind::Trait);
    let m = b.be("greet");
    b.add_method(greeter, m);
    let greeter_tag = TypeRef::nominal(greeter, Capability::Tag);

    let mut actors = Vec::new();
    for name in ["A", "B"] {
        let def = b.type_def(name, TypeDefKind::Actor);
        b.provides(def, greeter_tag.clone());
        add_create(&mut b, def, Capability::Tag);
        add_greet(&mut b, def);
        actors.push(def);
    }

    let main = b.type_def("Main", TypeDefKind::Actor);
    let create = b.intern("create");
    let greet = b.intern("greet");
    let g = b.intern("g");
    let mut body = BodyBuilder::new();
    let a = body.construct(TypeRef::nominal(actors[0], Capability::Tag), create, vec![]);
    let bind = body.bind(g, a, greeter_tag.clone());
    let other = body.construct(TypeRef::nominal(actors[1], Capability::Tag), create, vec![]);
    let receiver = body.local(g, greeter_tag.clone());
    let send = body.send(Some(receiver), greeter_tag, greet, vec![]);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind, other, send]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// Greeter without any implementer reachable from `Main.create`; `A` is
/// only constructed by `Main.later`, which runs after `greet` has been
/// requested on the trait. `B` is never constructed.
///
/// ```text
/// actor Main
///   new create() =>
///     let g: Greeter tag = this.anyone()
///     g.greet()
///     this.later()
///   fun tag anyone(): Greeter tag
///   fun tag later(): A tag => A.create()
/// ```
pub fn late_greeter() -> Fixture {
    let mut b = ProgramBuilder::new();
    let greeter = b.type_def("Greeter", TypeDefKind::Trait);
    let m = b.be("greet");
    b.add_method(greeter, m);
    let greeter_tag = TypeRef::nominal(greeter, Capability::Tag);

    let a = b.type_def("A", TypeDefKind::Actor);
    b.provides(a, greeter_tag.clone());
    add_create(&mut b, a, Capability::Tag);
    add_greet(&mut b, a);
    let other = b.type_def("B", TypeDefKind::Actor);
    b.provides(other, greeter_tag.clone());
    add_create(&mut b, other, Capability::Tag);
    add_greet(&mut b, other);

    let main = b.type_def("Main", TypeDefKind::Actor);
    let main_tag = TypeRef::nominal(main, Capability::Tag);
    let create = b.intern("create");
    let greet = b.intern("greet");
    let anyone = b.intern("anyone");
    let later = b.intern("later");
    let g = b.intern("g");

    let m = b
        .fun("anyone", Capability::Tag)
        .returns(greeter_tag.clone())
        .intrinsic();
    b.add_method(main, m);

    let mut body = BodyBuilder::new();
    let built = body.construct(TypeRef::nominal(a, Capability::Tag), create, vec![]);
    let m = b
        .fun("later", Capability::Tag)
        .returns(TypeRef::nominal(a, Capability::Tag))
        .body(body.finish(built));
    b.add_method(main, m);

    let mut body = BodyBuilder::new();
    let this = body.this(main_tag.clone());
    let value = body.call(Some(this), main_tag.clone(), anyone, vec![]);
    let bind = body.bind(g, value, greeter_tag.clone());
    let receiver = body.local(g, greeter_tag.clone());
    let send = body.send(Some(receiver), greeter_tag, greet, vec![]);
    let this = body.this(main_tag.clone());
    let call_later = body.call(Some(this), main_tag.clone(), later, vec![]);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind, send, call_later]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: main_tag,
    }
}

/// Handles into [`generic_list`].
pub struct ListFixture {
    pub fixture: Fixture,
    pub list_u8: TypeRef,
    pub u8_val: TypeRef,
    pub string_val: TypeRef,
}

/// ```text
/// class List[A]
///   var next: List[A] ref
///   new ref create()
///   fun box size(): U64 val => this.size()
///   fun ref push(x: A): U64 val
///   fun box map[B](): List[B] ref => this.size(); List[B].create()
/// primitive Parity
///   fun box even(): Bool val => this.odd()
///   fun box odd(): Bool val => this.even()
/// actor Main
///   new create() =>
///     let l: List[U8 val] ref = List[U8 val].create()
///     l.size()
///     (l: List[U8 val] val).size()
///     l.push(7)
///     l.map[String val]()
///     Parity.even()
/// ```
pub fn generic_list() -> ListFixture {
    let mut b = ProgramBuilder::new();
    let u8_def = b.type_def("U8", TypeDefKind::Numeric);
    let u64_def = b.type_def("U64", TypeDefKind::Numeric);
    let bool_def = b.type_def("Bool", TypeDefKind::Numeric);
    let string_def = b.type_def("String", TypeDefKind::Class);
    let list = b.generic_type_def("List", TypeDefKind::Class, &["A"]);

    let u8_val = TypeRef::nominal(u8_def, Capability::Val);
    let u64_val = TypeRef::nominal(u64_def, Capability::Val);
    let bool_val = TypeRef::nominal(bool_def, Capability::Val);
    let string_val = TypeRef::nominal(string_def, Capability::Val);
    let list_a = |cap| TypeRef::applied(list, vec![TypeRef::type_param(0)], cap);

    let create = b.intern("create");
    let size = b.intern("size");
    let push = b.intern("push");
    let map = b.intern("map");
    let x = b.intern("x");
    let l = b.intern("l");
    let even = b.intern("even");
    let odd = b.intern("odd");
    let type_b = b.intern("B");

    b.field(list, "next", list_a(Capability::Ref), false);
    add_create(&mut b, list, Capability::Ref);

    let mut body = BodyBuilder::new();
    let this = body.this(list_a(Capability::Box));
    let call = body.call(Some(this), list_a(Capability::Box), size, vec![]);
    let m = b
        .fun("size", Capability::Box)
        .returns(u64_val.clone())
        .body(body.finish(call));
    b.add_method(list, m);

    let m = b
        .fun("push", Capability::Ref)
        .param(x, TypeRef::type_param(0))
        .returns(u64_val.clone())
        .body(empty_body());
    b.add_method(list, m);

    let list_b = TypeRef::applied(list, vec![TypeRef::method_param(0)], Capability::Ref);
    let mut body = BodyBuilder::new();
    let this = body.this(list_a(Capability::Box));
    let count = body.call(Some(this), list_a(Capability::Box), size, vec![]);
    let built = body.construct(list_b.clone(), create, vec![]);
    let m = b
        .fun("map", Capability::Box)
        .type_params(vec![type_b])
        .returns(list_b)
        .body(body.finish_seq(vec![count, built]));
    b.add_method(list, m);

    let parity = b.type_def("Parity", TypeDefKind::Primitive);
    let parity_val = TypeRef::nominal(parity, Capability::Val);
    for (name, other) in [("even", odd), ("odd", even)] {
        let mut body = BodyBuilder::new();
        let this = body.this(parity_val.with_cap(Capability::Box));
        let call = body.call(Some(this), parity_val.with_cap(Capability::Box), other, vec![]);
        let m = b
            .fun(name, Capability::Box)
            .returns(bool_val.clone())
            .body(body.finish(call));
        b.add_method(parity, m);
    }

    let list_u8 = TypeRef::applied(list, vec![u8_val.clone()], Capability::Ref);
    let main = b.type_def("Main", TypeDefKind::Actor);
    let mut body = BodyBuilder::new();
    let built = body.construct(list_u8.clone(), create, vec![]);
    let bind = body.bind(l, built, list_u8.clone());
    let recv = body.local(l, list_u8.clone());
    let size_ref = body.call(Some(recv), list_u8.clone(), size, vec![]);
    let recv = body.local(l, list_u8.with_cap(Capability::Val));
    let size_val = body.call(Some(recv), list_u8.with_cap(Capability::Val), size, vec![]);
    let seven = body.literal(Literal::Int(7), u8_val.clone());
    let recv = body.local(l, list_u8.clone());
    let pushed = body.call(Some(recv), list_u8.clone(), push, vec![seven]);
    let recv = body.local(l, list_u8.clone());
    let mapped = body.call_generic(
        Some(recv),
        list_u8.clone(),
        map,
        vec![string_val.clone()],
        vec![],
    );
    let parity_call = body.call(None, parity_val, even, vec![]);
    let m = b.constructor("create", Capability::Tag).body(body.finish_seq(vec![
        bind,
        size_ref,
        size_val,
        pushed,
        mapped,
        parity_call,
    ]));
    b.add_method(main, m);

    ListFixture {
        fixture: Fixture {
            program: b.build(),
            main: TypeRef::nominal(main, Capability::Tag),
        },
        list_u8,
        u8_val,
        string_val,
    }
}

/// ```text
/// interface Show
///   fun box show(): String val
/// class Point                       (no `is Show`)
///   new ref create()
///   fun box show(): String val
/// class Hidden                      (never constructed)
///   fun box show(): String val
/// actor Main
///   new create() =>
///     let s: Show box = Point.create()
///     s.show()
/// ```
pub fn structural_show() -> Fixture {
    let mut b = ProgramBuilder::new();
    let string_def = b.type_def("String", TypeDefKind::Class);
    let string_val = TypeRef::nominal(string_def, Capability::Val);
    let show_def = b.type_def("Show", TypeDefKind::Interface);
    let m = b.fun("show", Capability::Box).returns(string_val.clone());
    b.add_method(show_def, m);

    let mut classes = Vec::new();
    for name in ["Point", "Hidden"] {
        let def = b.type_def(name, TypeDefKind::Class);
        classes.push(def);
        add_create(&mut b, def, Capability::Ref);
        let m = b
            .fun("show", Capability::Box)
            .returns(string_val.clone())
            .intrinsic();
        b.add_method(def, m);
    }
    let point = classes[0];

    let main = b.type_def("Main", TypeDefKind::Actor);
    let create = b.intern("create");
    let show = b.intern("show");
    let s = b.intern("s");
    let show_box = TypeRef::nominal(show_def, Capability::Box);
    let mut body = BodyBuilder::new();
    let built = body.construct(TypeRef::nominal(point, Capability::Ref), create, vec![]);
    let bind = body.bind(s, built, show_box.clone());
    let recv = body.local(s, show_box.clone());
    let call = body.call(Some(recv), show_box, show, vec![]);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind, call]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// ```text
/// interface Mapper
///   fun box apply[T]()
/// class Real is Mapper
///   new ref create()
///   fun box apply[T]()
/// class Plain                       (same name, no type parameter)
///   new ref create()
///   fun box apply()
/// actor Main
///   new create() =>
///     let m: Mapper box = Real.create()
///     m.apply[U8 val]()
///     Plain.create().apply()
/// ```
pub fn generic_method_interface() -> Fixture {
    let mut b = ProgramBuilder::new();
    let u8_def = b.type_def("U8", TypeDefKind::Numeric);
    let u8_val = TypeRef::nominal(u8_def, Capability::Val);
    let type_t = b.intern("T");

    let mapper = b.type_def("Mapper", TypeDefKind::Interface);
    let m = b.fun("apply", Capability::Box).type_params(vec![type_t]);
    b.add_method(mapper, m);

    let real = b.type_def("Real", TypeDefKind::Class);
    b.provides(real, TypeRef::nominal(mapper, Capability::Ref));
    add_create(&mut b, real, Capability::Ref);
    let m = b
        .fun("apply", Capability::Box)
        .type_params(vec![type_t])
        .intrinsic();
    b.add_method(real, m);

    let plain = b.type_def("Plain", TypeDefKind::Class);
    add_create(&mut b, plain, Capability::Ref);
    let m = b.fun("apply", Capability::Box).intrinsic();
    b.add_method(plain, m);

    let main = b.type_def("Main", TypeDefKind::Actor);
    let create = b.intern("create");
    let apply = b.intern("apply");
    let m_local = b.intern("m");
    let mapper_box = TypeRef::nominal(mapper, Capability::Box);
    let plain_ref = TypeRef::nominal(plain, Capability::Ref);
    let mut body = BodyBuilder::new();
    let built = body.construct(TypeRef::nominal(real, Capability::Ref), create, vec![]);
    let bind = body.bind(m_local, built, mapper_box.clone());
    let recv = body.local(m_local, mapper_box.clone());
    let generic = body.call_generic(Some(recv), mapper_box, apply, vec![u8_val], vec![]);
    let built = body.construct(plain_ref.clone(), create, vec![]);
    let direct = body.call(Some(built), plain_ref, apply, vec![]);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind, generic, direct]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// ```text
/// interface Getter[A]
///   fun box get(): A
/// class Cell[A]                     (no `is Getter[A]`)
///   new ref create()
///   fun box get(): A
/// actor Main
///   new create() =>
///     let g: Getter[U8 val] box = Cell[U8 val].create()
///     Cell[String val].create()
///     g.get()
/// ```
pub fn generic_getter() -> Fixture {
    let mut b = ProgramBuilder::new();
    let u8_def = b.type_def("U8", TypeDefKind::Numeric);
    let string_def = b.type_def("String", TypeDefKind::Class);
    let u8_val = TypeRef::nominal(u8_def, Capability::Val);
    let string_val = TypeRef::nominal(string_def, Capability::Val);

    let getter = b.generic_type_def("Getter", TypeDefKind::Interface, &["A"]);
    let m = b.fun("get", Capability::Box).returns(TypeRef::type_param(0));
    b.add_method(getter, m);

    let cell = b.generic_type_def("Cell", TypeDefKind::Class, &["A"]);
    add_create(&mut b, cell, Capability::Ref);
    let m = b
        .fun("get", Capability::Box)
        .returns(TypeRef::type_param(0))
        .intrinsic();
    b.add_method(cell, m);

    let main = b.type_def("Main", TypeDefKind::Actor);
    let create = b.intern("create");
    let get = b.intern("get");
    let g = b.intern("g");
    let getter_box = TypeRef::applied(getter, vec![u8_val.clone()], Capability::Box);
    let mut body = BodyBuilder::new();
    let built = body.construct(TypeRef::applied(cell, vec![u8_val], Capability::Ref), create, vec![]);
    let bind = body.bind(g, built, getter_box.clone());
    let other = body.construct(
        TypeRef::applied(cell, vec![string_val], Capability::Ref),
        create,
        vec![],
    );
    let recv = body.local(g, getter_box.clone());
    let call = body.call(Some(recv), getter_box, get, vec![]);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind, other, call]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// ```text
/// trait Shape
/// class Square is Shape
///   new ref create()
/// trait Factory
///   fun box make(): Shape ref
/// class SquareFactory is Factory
///   new ref create()
///   fun box make(): Square ref => Square.create()
/// actor Main
///   new create() =>
///     let f: Factory box = SquareFactory.create()
///     f.make()
/// ```
pub fn covariant_factory() -> Fixture {
    let mut b = ProgramBuilder::new();
    let shape = b.type_def("Shape", TypeDefKind::Trait);
    let square = b.type_def("Square", TypeDefKind::Class);
    b.provides(square, TypeRef::nominal(shape, Capability::Ref));
    add_create(&mut b, square, Capability::Ref);

    let factory = b.type_def("Factory", TypeDefKind::Trait);
    let m = b
        .fun("make", Capability::Box)
        .returns(TypeRef::nominal(shape, Capability::Ref));
    b.add_method(factory, m);

    let square_factory = b.type_def("SquareFactory", TypeDefKind::Class);
    b.provides(square_factory, TypeRef::nominal(factory, Capability::Ref));
    add_create(&mut b, square_factory, Capability::Ref);
    let create = b.intern("create");
    let square_ref = TypeRef::nominal(square, Capability::Ref);
    let mut body = BodyBuilder::new();
    let built = body.construct(square_ref.clone(), create, vec![]);
    let m = b
        .fun("make", Capability::Box)
        .returns(square_ref)
        .body(body.finish(built));
    b.add_method(square_factory, m);

    let main = b.type_def("Main", TypeDefKind::Actor);
    let make = b.intern("make");
    let f = b.intern("f");
    let factory_box = TypeRef::nominal(factory, Capability::Box);
    let mut body = BodyBuilder::new();
    let built = body.construct(TypeRef::nominal(square_factory, Capability::Ref), create, vec![]);
    let bind = body.bind(f, built, factory_box.clone());
    let recv = body.local(f, factory_box.clone());
    let call = body.call(Some(recv), factory_box, make, vec![]);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind, call]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// ```text
/// interface Any
/// class Resource
///   new ref create()
///   fun box _final()                (compiler supplied)
/// actor Main
///   new create() =>
///     let x: Any box = 7
///     let t: (U32 val, Resource ref) = (7, Resource.create())
/// ```
pub fn boxing_and_lifecycle() -> Fixture {
    let mut b = ProgramBuilder::new();
    let none = b.none_type();
    let any = b.type_def("Any", TypeDefKind::Interface);
    let u32_def = b.type_def("U32", TypeDefKind::Numeric);
    let u32_val = TypeRef::nominal(u32_def, Capability::Val);
    let resource = b.type_def("Resource", TypeDefKind::Class);
    let resource_ref = TypeRef::nominal(resource, Capability::Ref);
    add_create(&mut b, resource, Capability::Ref);
    let m = b
        .fun("_final", Capability::Box)
        .returns(TypeRef::nominal(none, Capability::Val))
        .intrinsic();
    b.add_method(resource, m);

    let main = b.type_def("Main", TypeDefKind::Actor);
    let create = b.intern("create");
    let x = b.intern("x");
    let t = b.intern("t");
    let pair = TypeRef::tuple(vec![u32_val.clone(), resource_ref.clone()]);
    let mut body = BodyBuilder::new();
    let seven = body.literal(Literal::Int(7), u32_val.clone());
    let bind_x = body.bind(x, seven, TypeRef::nominal(any, Capability::Box));
    let seven = body.literal(Literal::Int(7), u32_val);
    let built = body.construct(resource_ref, create, vec![]);
    let tuple = body.tuple(vec![seven, built], pair.clone());
    let bind_t = body.bind(t, tuple, pair);
    let m = b
        .constructor("create", Capability::Tag)
        .body(body.finish_seq(vec![bind_x, bind_t]));
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// ```text
/// primitive Callback                (the type of a bare lambda)
///   fun @apply(x: U8 val): U8 val   (compiler supplied)
/// primitive Ffi
///   fun @open(): U8 val
///   fun @close(): U8 val
/// actor Main
///   new create(cb: Callback val, ffi: Ffi val) => None
/// ```
pub fn bare_callback() -> Fixture {
    let mut b = ProgramBuilder::new();
    let u8_def = b.type_def("U8", TypeDefKind::Numeric);
    let u8_val = TypeRef::nominal(u8_def, Capability::Val);
    let x = b.intern("x");

    let callback = b.type_def("Callback", TypeDefKind::Primitive);
    let m = b
        .fun("apply", Capability::Box)
        .bare()
        .param(x, u8_val.clone())
        .returns(u8_val.clone())
        .intrinsic();
    b.add_method(callback, m);

    let ffi = b.type_def("Ffi", TypeDefKind::Primitive);
    for name in ["open", "close"] {
        let m = b
            .fun(name, Capability::Box)
            .bare()
            .returns(u8_val.clone())
            .intrinsic();
        b.add_method(ffi, m);
    }

    let main = b.type_def("Main", TypeDefKind::Actor);
    let cb = b.intern("cb");
    let handle = b.intern("ffi");
    let m = b
        .constructor("create", Capability::Tag)
        .param(cb, TypeRef::nominal(callback, Capability::Val))
        .param(handle, TypeRef::nominal(ffi, Capability::Val))
        .body(empty_body());
    b.add_method(main, m);

    Fixture {
        program: b.build(),
        main: TypeRef::nominal(main, Capability::Tag),
    }
}

/// A program whose entry calls a function that has no body.
pub fn missing_body() -> Fixture {
    let mut b = ProgramBuilder::new();
    let bool_def = b.type_def("Bool", TypeDefKind::Numeric);
    let main = b.type_def("Main", TypeDefKind::Actor);
    let main_tag = TypeRef::nominal(main, Capability::Tag);
    let m = b
        .fun("broken", Capability::Tag)
        .returns(TypeRef::nominal(bool_def, Capability::Val));
    b.add_method(main, m);
    let broken = b.intern("broken");
    let mut body = BodyBuilder::new();
    let this = body.this(main_tag.clone());
    let call = body.call(Some(this), main_tag.clone(), broken, vec![]);
    let m = b.constructor("create", Capability::Tag).body(body.finish(call));
    b.add_method(main, m);
    Fixture {
        program: b.build(),
        main: main_tag,
    }
}

/// A program whose entry sends a message to a synchronous function.
pub fn kind_mismatch() -> Fixture {
    let mut b = ProgramBuilder::new();
    let main = b.type_def("Main", TypeDefKind::Actor);
    let main_tag = TypeRef::nominal(main, Capability::Tag);
    let m = b.fun("helper", Capability::Tag).body(empty_body());
    b.add_method(main, m);
    let helper = b.intern("helper");
    let mut body = BodyBuilder::new();
    let this = body.this(main_tag.clone());
    let send = body.send(Some(this), main_tag.clone(), helper, vec![]);
    let m = b.constructor("create", Capability::Tag).body(body.finish(send));
    b.add_method(main, m);
    Fixture {
        program: b.build(),
        main: main_tag,
    }
}
